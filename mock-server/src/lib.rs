use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Everything the server saw about one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub content_type: Option<String>,
    pub body: String,
}

pub type Log = Arc<RwLock<Vec<Echo>>>;

pub fn app() -> Router {
    let log: Log = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/__requests", get(list_requests))
        .route("/status/{code}", get(status).post(status))
        .fallback(echo)
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_requests(State(log): State<Log>) -> Json<Vec<Echo>> {
    Json(log.read().await.clone())
}

async fn echo(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    let echo = describe(&method, &uri, query, &headers, body);
    tracing::debug!(method = %echo.method, path = %echo.path, "echoing request");
    log.write().await.push(echo.clone());
    Json(echo)
}

async fn status(
    Path(code): Path<u16>,
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<Echo>), StatusCode> {
    let code = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((code, Json(describe(&method, &uri, query, &headers, body))))
}

fn describe(
    method: &Method,
    uri: &Uri,
    query: BTreeMap<String, String>,
    headers: &HeaderMap,
    body: String,
) -> Echo {
    let text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Echo {
        id: Uuid::new_v4(),
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers: headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect(),
        cookies: text(header::COOKIE)
            .map(|raw| parse_cookies(&raw))
            .unwrap_or_default(),
        content_type: text(header::CONTENT_TYPE),
        body,
    }
}

/// Split a `Cookie` header into name/value pairs.
pub fn parse_cookies(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}
