//! Transports execute finished request descriptions.
//!
//! # Design
//! The engine never performs I/O itself. Anything implementing `Transport`
//! can sit behind a `Client`: the bundled blocking `UreqTransport`, a test
//! double that records requests, or a host-provided bridge. The response
//! type is the transport's own and is returned to the caller untouched.

use crate::http::HttpRequest;

/// Executes an `HttpRequest` and returns whatever the underlying client produces.
pub trait Transport {
    type Response;
    type Error: std::error::Error + Send + Sync + 'static;

    fn dispatch(&self, request: &HttpRequest) -> Result<Self::Response, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Response = T::Response;
    type Error = T::Error;

    fn dispatch(&self, request: &HttpRequest) -> Result<Self::Response, Self::Error> {
        (**self).dispatch(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::{UreqTransport, UreqTransportError};

#[cfg(feature = "ureq")]
mod blocking {
    use std::time::Duration;

    use serde_json::Value;
    use tracing::debug;
    use url::Url;

    use super::Transport;
    use crate::auth::AuthScheme;
    use crate::http::{render_value, Args, HttpMethod, HttpRequest, HttpResponse};

    /// Errors raised by `UreqTransport`.
    #[derive(thiserror::Error, Debug)]
    pub enum UreqTransportError {
        #[error("HTTP error: {0}")]
        Http(#[from] ureq::Error),

        #[error("URL parse error: {0}")]
        UrlParse(#[from] url::ParseError),

        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),

        #[error("{scheme:?} authentication is not supported by this transport")]
        UnsupportedAuth { scheme: AuthScheme },

        #[error("line break in multipart part header: {value:?}")]
        InvalidMultipartHeader { value: String },
    }

    /// Blocking transport backed by a ureq agent.
    ///
    /// Non-2xx statuses come back as `HttpResponse` values, not errors.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::with_timeout(None)
        }

        pub fn with_timeout(timeout: Option<Duration>) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Encoded body plus its content type.
    struct Body {
        content_type: String,
        bytes: Vec<u8>,
    }

    impl Transport for UreqTransport {
        type Response = HttpResponse;
        type Error = UreqTransportError;

        fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, UreqTransportError> {
            let url = full_url(request)?;
            let headers = header_list(request)?;
            let body = encode_body(request)?;
            debug!(method = %request.method, %url, "dispatching request");

            let result = match request.method {
                HttpMethod::Get => call(with_headers(self.agent.get(url.as_str()), &headers), body),
                HttpMethod::Head => call(with_headers(self.agent.head(url.as_str()), &headers), body),
                HttpMethod::Delete => call(with_headers(self.agent.delete(url.as_str()), &headers), body),
                HttpMethod::Options => {
                    call(with_headers(self.agent.options(url.as_str()), &headers), body)
                }
                HttpMethod::Post => send(with_headers(self.agent.post(url.as_str()), &headers), body),
                HttpMethod::Put => send(with_headers(self.agent.put(url.as_str()), &headers), body),
                HttpMethod::Patch => send(with_headers(self.agent.patch(url.as_str()), &headers), body),
            };
            let mut response = result?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.body_mut().read_to_string()?;
            debug!(status, "received response");

            Ok(HttpResponse { status, headers, body })
        }
    }

    fn with_headers<B>(
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    /// Methods without a conventional body still carry one when a body bucket is set.
    fn call(
        builder: ureq::RequestBuilder<ureq::typestate::WithoutBody>,
        body: Option<Body>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match body {
            Some(body) => send(builder.force_send_body(), Some(body)),
            None => builder.call(),
        }
    }

    fn send(
        builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
        body: Option<Body>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match body {
            Some(body) => builder
                .content_type(body.content_type.as_str())
                .send(body.bytes.as_slice()),
            None => builder.send_empty(),
        }
    }

    fn full_url(request: &HttpRequest) -> Result<Url, UreqTransportError> {
        let mut url = Url::parse(&request.url)?;
        if request.query.is_some() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in HttpRequest::string_pairs(request.query.as_ref()) {
                pairs.append_pair(name, &value);
            }
        }
        Ok(url)
    }

    fn header_list(request: &HttpRequest) -> Result<Vec<(String, String)>, UreqTransportError> {
        let mut headers: Vec<(String, String)> = HttpRequest::string_pairs(request.headers.as_ref())
            .map(|(name, value)| (name.to_string(), value))
            .collect();

        let cookie = HttpRequest::string_pairs(request.cookies.as_ref())
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        if !cookie.is_empty() {
            headers.push(("Cookie".to_string(), cookie));
        }

        if let Some(auth) = &request.auth {
            let (name, value) = auth
                .header()
                .ok_or(UreqTransportError::UnsupportedAuth { scheme: auth.scheme })?;
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.to_string(), value));
        }
        Ok(headers)
    }

    /// Pick the body encoding: files force multipart, then form, then JSON.
    fn encode_body(request: &HttpRequest) -> Result<Option<Body>, UreqTransportError> {
        if let Some(files) = &request.files {
            return multipart(request.form.as_ref(), files).map(Some);
        }
        if request.form.is_some() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(HttpRequest::string_pairs(request.form.as_ref()))
                .finish();
            return Ok(Some(Body {
                content_type: "application/x-www-form-urlencoded".to_string(),
                bytes: encoded.into_bytes(),
            }));
        }
        if let Some(json) = &request.json {
            return Ok(Some(Body {
                content_type: "application/json".to_string(),
                bytes: serde_json::to_vec(json)?,
            }));
        }
        Ok(None)
    }

    /// Encode form fields and files as `multipart/form-data`.
    ///
    /// A file value is either its contents as a string, or an object with
    /// `content` and optional `filename` / `content_type`.
    fn multipart(form: Option<&Args>, files: &Args) -> Result<Body, UreqTransportError> {
        let boundary = format!("----callsheet-{}", uuid::Uuid::new_v4().simple());
        let mut out = Vec::new();

        for (name, value) in form.into_iter().flatten() {
            let name = quoted(name)?;
            out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            out.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
            out.extend_from_slice(render_value(value).as_bytes());
            out.extend_from_slice(b"\r\n");
        }

        for (name, value) in files {
            let (filename, content_type, content) = match value {
                Value::Object(spec) => (
                    spec.get("filename").map(render_value).unwrap_or_else(|| name.clone()),
                    spec.get("content_type")
                        .map(render_value)
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    spec.get("content").map(render_value).unwrap_or_default(),
                ),
                other => (
                    name.clone(),
                    "application/octet-stream".to_string(),
                    render_value(other),
                ),
            };
            let (name, filename) = (quoted(name)?, quoted(&filename)?);
            single_line(&content_type)?;
            out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            out.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            );
            out.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            out.extend_from_slice(content.as_bytes());
            out.extend_from_slice(b"\r\n");
        }

        out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        Ok(Body {
            content_type: format!("multipart/form-data; boundary={boundary}"),
            bytes: out,
        })
    }

    /// Escape a `Content-Disposition` parameter value.
    fn quoted(value: &str) -> Result<String, UreqTransportError> {
        single_line(value)?;
        Ok(value.replace('\\', "\\\\").replace('"', "\\\""))
    }

    fn single_line(value: &str) -> Result<(), UreqTransportError> {
        if value.contains(['\r', '\n']) {
            return Err(UreqTransportError::InvalidMultipartHeader {
                value: value.to_string(),
            });
        }
        Ok(())
    }

}
