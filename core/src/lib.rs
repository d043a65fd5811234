//! Declarative HTTP request composition.
//!
//! # Overview
//! Describe an endpoint once (a method, a path template and an ordered list
//! of parameters) and call it later with keyword-style arguments. The
//! engine turns those arguments into a fully assembled `HttpRequest` and
//! hands it to a `Transport`.
//!
//! ```no_run
//! use callsheet_core::{Client, Endpoint, Parameter, UreqTransport};
//! use serde_json::json;
//!
//! let search = Endpoint::get("/search").param(Parameter::query("q"));
//! let client = Client::new("https://api.example.com", UreqTransport::new());
//! let response = client.bind(&search).call(json!({"q": "cats"}))?;
//! println!("{}", response.status);
//! # Ok::<(), callsheet_core::Error>(())
//! ```
//!
//! # Design
//! - Parameters are a closed set of kinds; each writes one key into one
//!   bucket of a per-call `RequestDraft` (or sets its auth).
//! - Client parameters apply before endpoint parameters, so endpoint
//!   parameters win on the same bucket and key.
//! - URL templating is deferred: template parameters stage values and a
//!   single followup substitutes them after every parameter has applied.
//! - `BoundEndpoint::build` stops short of I/O so callers can execute the
//!   request themselves; `call` dispatches through the client's transport.

pub mod auth;
pub mod client;
pub mod draft;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod parameter;
pub mod template;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use auth::{Auth, AuthScheme};
pub use client::{Api, Client, ClientConfig};
pub use draft::{Bucket, Followup, RequestDraft};
pub use endpoint::{BoundEndpoint, Endpoint};
pub use error::Error;
pub use http::{Args, HttpMethod, HttpRequest, HttpResponse};
pub use parameter::{apply_parameters, Credentials, Field, Parameter};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::{UreqTransport, UreqTransportError};
