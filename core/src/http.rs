//! HTTP request descriptions handed to a transport.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! engine assembles an `HttpRequest` and never touches the network itself;
//! a `Transport` (or the caller, via `BoundEndpoint::build`) executes it.
//!
//! Request facets are kept as optional JSON maps: a bucket is `None` until
//! some parameter writes into it, so transports can tell "not set" from
//! "set but empty".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Auth;
use crate::error::Error;

/// Keyword arguments for a call, keyed by source key.
pub type Args = serde_json::Map<String, Value>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// A fully assembled HTTP request described as plain data.
///
/// Produced by `BoundEndpoint::build` once every parameter has applied and
/// the URL template has been resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Args>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<Args>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<Args>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Args>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<Args>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Args>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: None,
            form: None,
            json: None,
            headers: None,
            cookies: None,
            files: None,
            auth: None,
        }
    }

    /// Iterate a bucket's entries with values rendered as strings.
    pub fn string_pairs(bucket: Option<&Args>) -> impl Iterator<Item = (&str, String)> {
        bucket
            .into_iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), render_value(v)))
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Render an argument value the way it appears in a URL, header or cookie.
///
/// Strings are used as-is, null becomes empty, anything else is its JSON text.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
