//! The client: root URL, default arguments, shared definitions, transport.
//!
//! # Design
//! `Client` holds the call-time defaults and the transport handle. The
//! endpoint definitions and client-scoped parameters live in an `Api`
//! behind an `Arc`, so many clients (say, one per account) share one set
//! of definitions. Builder methods copy-on-write that `Arc`.
//!
//! Endpoints are reached explicitly: `client.bind(&endpoint)` for a
//! definition the caller owns, or `client.endpoint("name")` for one
//! registered on the client.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::draft::RequestDraft;
use crate::endpoint::{BoundEndpoint, Endpoint};
use crate::error::Error;
use crate::http::Args;
use crate::parameter::{apply_parameters, Parameter};
use crate::transport::Transport;

/// Client-scoped parameters and named endpoint definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Api {
    /// Applied to every call before the endpoint's own parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub endpoints: BTreeMap<String, Endpoint>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn endpoint(mut self, name: impl Into<String>, endpoint: Endpoint) -> Self {
        self.endpoints.insert(name.into(), endpoint);
        self
    }
}

/// Serialized form of a client definition.
///
/// ```json
/// {
///   "root": "https://api.example.com",
///   "defaults": {"format": "json"},
///   "parameters": [{"in": "header", "name": "Authorization", "key": "token"}],
///   "endpoints": {
///     "search": {"method": "GET", "path": "/search", "parameters": [{"in": "query", "name": "q"}]}
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub root: String,
    #[serde(default)]
    pub defaults: Args,
    #[serde(flatten)]
    pub api: Api,
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

/// Entry point for calling endpoints through a transport.
pub struct Client<T> {
    root: String,
    defaults: Args,
    api: Arc<Api>,
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(root: &str, transport: T) -> Self {
        Self::with_api(root, Arc::new(Api::default()), transport)
    }

    /// Create a client sharing an existing set of definitions.
    pub fn with_api(root: &str, api: Arc<Api>, transport: T) -> Self {
        Self {
            root: root.trim_end_matches('/').to_string(),
            defaults: Args::new(),
            api,
            transport,
        }
    }

    pub fn from_config(config: ClientConfig, transport: T) -> Self {
        let mut client = Self::with_api(&config.root, Arc::new(config.api), transport);
        client.defaults = config.defaults;
        client
    }

    pub fn with_defaults(mut self, defaults: Args) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        Arc::make_mut(&mut self.api).parameters.push(parameter);
        self
    }

    pub fn with_endpoint(mut self, name: impl Into<String>, endpoint: Endpoint) -> Self {
        Arc::make_mut(&mut self.api).endpoints.insert(name.into(), endpoint);
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn defaults(&self) -> &Args {
        &self.defaults
    }

    pub fn api(&self) -> &Arc<Api> {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Bind a caller-owned endpoint definition to this client.
    pub fn bind<'a>(&'a self, endpoint: &'a Endpoint) -> BoundEndpoint<'a, T> {
        BoundEndpoint::new(endpoint, self)
    }

    /// Bind the endpoint registered under `name`.
    pub fn endpoint(&self, name: &str) -> Result<BoundEndpoint<'_, T>, Error> {
        let endpoint = self
            .api
            .endpoints
            .get(name)
            .ok_or_else(|| Error::UnknownEndpoint(name.to_string()))?;
        Ok(BoundEndpoint::new(endpoint, self))
    }

    /// Names of the registered endpoints, sorted.
    pub fn endpoint_names(&self) -> impl Iterator<Item = &str> {
        self.api.endpoints.keys().map(String::as_str)
    }

    pub fn apply_parameters(&self, draft: &mut RequestDraft, args: &Args) -> Result<(), Error> {
        apply_parameters(&self.api.parameters, draft, args)
    }
}
