use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Echo};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- echo ---

#[tokio::test]
async fn echoes_get_with_query() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/search?q=cats&page=2")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.path, "/search");
    assert_eq!(echo.query["q"], "cats");
    assert_eq!(echo.query["page"], "2");
    assert!(echo.body.is_empty());
}

#[tokio::test]
async fn echoes_json_body() {
    let resp = app()
        .oneshot(json_request("PUT", "/todos/7", r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.path, "/todos/7");
    assert_eq!(echo.content_type.as_deref(), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&echo.body).unwrap();
    assert_eq!(body["title"], "Buy milk");
}

#[tokio::test]
async fn echoes_headers_and_cookies() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/me")
                .header("x-api-key", "secret")
                .header(http::header::COOKIE, "session=abc; theme=dark")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.headers["x-api-key"], "secret");
    assert_eq!(echo.cookies["session"], "abc");
    assert_eq!(echo.cookies["theme"], "dark");
}

#[tokio::test]
async fn each_echo_gets_a_fresh_id() {
    let app = app();
    let first: Echo = body_json(
        app.clone()
            .oneshot(Request::builder().uri("/a").body(String::new()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    let second: Echo = body_json(
        app.oneshot(Request::builder().uri("/a").body(String::new()).unwrap())
            .await
            .unwrap(),
    )
    .await;
    assert_ne!(first.id, second.id);
}

// --- request log ---

#[tokio::test]
async fn request_log_records_echoes() {
    let app = app();
    app.clone()
        .oneshot(json_request("POST", "/items", r#"{"n":1}"#))
        .await
        .unwrap();

    let resp = app
        .oneshot(Request::builder().uri("/__requests").body(String::new()).unwrap())
        .await
        .unwrap();
    let log: Vec<Echo> = body_json(resp).await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].method, "POST");
    assert_eq!(log[0].path, "/items");
}

#[tokio::test]
async fn request_log_starts_empty() {
    let resp = app()
        .oneshot(Request::builder().uri("/__requests").body(String::new()).unwrap())
        .await
        .unwrap();
    let log: Vec<Echo> = body_json(resp).await;
    assert!(log.is_empty());
}

// --- status ---

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/418").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::IM_A_TEAPOT);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.path, "/status/418");
}

#[tokio::test]
async fn status_route_rejects_invalid_code() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/42").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_route_rejects_non_numeric_code() {
    let resp = app()
        .oneshot(Request::builder().uri("/status/teapot").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(!body_bytes(resp).await.is_empty());
}
