//! Endpoint definitions and their per-call bindings to a client.
//!
//! # Design
//! An `Endpoint` is defined once and never mutated; it is shared by every
//! client and every call. Binding it to a `Client` is cheap (two
//! references), and each call allocates its own `RequestDraft`, so nothing
//! is shared between calls except read-only definitions and the transport.
//!
//! A call walks through fixed stages: create the draft from the merged
//! arguments, apply client parameters, apply endpoint parameters, run
//! followups, dispatch. Any error stops the walk and nothing is sent.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::Client;
use crate::draft::RequestDraft;
use crate::error::Error;
use crate::http::{Args, HttpMethod, HttpRequest};
use crate::parameter::{apply_parameters, Parameter};
use crate::transport::Transport;

/// One API operation: method, path template and its own parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub method: HttpMethod,
    /// Appended to the client root. May contain `{placeholder}` tokens.
    pub path: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Endpoint {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            parameters: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn apply_parameters(&self, draft: &mut RequestDraft, args: &Args) -> Result<(), Error> {
        apply_parameters(&self.parameters, draft, args)
    }
}

/// An endpoint paired with the client it will be called through.
pub struct BoundEndpoint<'a, T> {
    endpoint: &'a Endpoint,
    client: &'a Client<T>,
}

impl<'a, T: Transport> BoundEndpoint<'a, T> {
    pub(crate) fn new(endpoint: &'a Endpoint, client: &'a Client<T>) -> Self {
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.endpoint
    }

    /// Client root followed by the endpoint path, placeholders unresolved.
    pub fn full_url(&self) -> String {
        format!("{}{}", self.client.root(), self.endpoint.path)
    }

    /// Assemble the request without sending it.
    ///
    /// `args` must serialize to a JSON object; its entries override the
    /// client defaults with the same name.
    pub fn build(&self, args: impl Serialize) -> Result<HttpRequest, Error> {
        let args = self.merged_args(args)?;
        let mut draft = RequestDraft::new(self.endpoint.method, self.full_url());
        debug!(method = %draft.method, url = %draft.url, "building request");

        self.client.apply_parameters(&mut draft, &args)?;
        debug!("applied client parameters");
        self.endpoint.apply_parameters(&mut draft, &args)?;
        debug!("applied endpoint parameters");

        draft.finalize()?;
        debug!(url = %draft.url, "resolved followups");
        Ok(draft.into_request())
    }

    /// Assemble the request and hand it to the client's transport.
    pub fn call(&self, args: impl Serialize) -> Result<T::Response, Error> {
        let request = self.build(args)?;
        debug!(method = %request.method, url = %request.url, "dispatching");
        self.client
            .transport()
            .dispatch(&request)
            .map_err(Error::transport)
    }

    fn merged_args(&self, args: impl Serialize) -> Result<Args, Error> {
        let mut merged = self.client.defaults().clone();
        match serde_json::to_value(args)? {
            serde_json::Value::Object(supplied) => merged.extend(supplied),
            serde_json::Value::Null => {}
            other => return Err(Error::InvalidArguments(other.to_string())),
        }
        Ok(merged)
    }
}
