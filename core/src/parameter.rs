//! Parameters: rules that turn call arguments into draft mutations.
//!
//! # Design
//! The set of parameter kinds is closed. Every field-style kind runs the
//! same algorithm and differs only in the bucket it writes; the auth kinds
//! read a credential pair and set the draft's auth instead. URL template
//! parameters stage their value and register a followup so substitution
//! happens once, after every parameter has applied.
//!
//! Parameters deserialize from JSON with an `"in"` tag, e.g.
//! `{"in": "query", "name": "q", "required": true}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::auth::{Auth, AuthScheme};
use crate::draft::{Bucket, Followup, RequestDraft};
use crate::error::Error;
use crate::http::{render_value, Args};

/// A single named value read from the call arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Key written into the target bucket.
    pub name: String,
    /// Call argument to read. Falls back to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            default: None,
            required: false,
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn source_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// Resolve the value from `args` (or the default) and write it into `bucket`.
    fn apply(&self, bucket: Bucket, draft: &mut RequestDraft, args: &Args) -> Result<(), Error> {
        let key = self.source_key();
        match args.get(key).or(self.default.as_ref()) {
            Some(value) => {
                draft.insert(bucket, self.name.clone(), value.clone());
                Ok(())
            }
            None if self.required => Err(Error::MissingRequiredParameter {
                key: key.to_string(),
            }),
            None => {
                trace!(%key, "optional parameter not supplied");
                Ok(())
            }
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::new(name)
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Field::new(name)
    }
}

/// The argument names a credential pair is read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username_key: String,
    pub password_key: String,
    #[serde(default)]
    pub required: bool,
}

impl Credentials {
    pub fn new(username_key: impl Into<String>, password_key: impl Into<String>) -> Self {
        Self {
            username_key: username_key.into(),
            password_key: password_key.into(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Build an auth object when both halves are present.
    ///
    /// A partial pair is an error when required and a no-op otherwise.
    fn apply(&self, scheme: AuthScheme, draft: &mut RequestDraft, args: &Args) -> Result<(), Error> {
        let username = args.get(&self.username_key);
        let password = args.get(&self.password_key);
        match (username, password) {
            (Some(username), Some(password)) => {
                draft.set_auth(Auth::new(scheme, render_value(username), render_value(password)));
                Ok(())
            }
            _ if self.required => {
                let key = if username.is_none() {
                    &self.username_key
                } else {
                    &self.password_key
                };
                Err(Error::MissingRequiredParameter { key: key.clone() })
            }
            _ => {
                trace!(?scheme, "incomplete optional credentials, skipping auth");
                Ok(())
            }
        }
    }
}

/// A rule mapping call arguments onto a request draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "in", rename_all = "snake_case")]
pub enum Parameter {
    Query(Field),
    Form(Field),
    Json(Field),
    Header(Field),
    Cookie(Field),
    File(Field),
    UrlTemplate(Field),
    BasicAuth(Credentials),
    DigestAuth(Credentials),
    ProxyAuth(Credentials),
}

impl Parameter {
    pub fn query(field: impl Into<Field>) -> Self {
        Parameter::Query(field.into())
    }

    pub fn form(field: impl Into<Field>) -> Self {
        Parameter::Form(field.into())
    }

    pub fn json(field: impl Into<Field>) -> Self {
        Parameter::Json(field.into())
    }

    pub fn header(field: impl Into<Field>) -> Self {
        Parameter::Header(field.into())
    }

    pub fn cookie(field: impl Into<Field>) -> Self {
        Parameter::Cookie(field.into())
    }

    pub fn file(field: impl Into<Field>) -> Self {
        Parameter::File(field.into())
    }

    pub fn url_template(field: impl Into<Field>) -> Self {
        Parameter::UrlTemplate(field.into())
    }

    pub fn basic_auth(username_key: impl Into<String>, password_key: impl Into<String>) -> Self {
        Parameter::BasicAuth(Credentials::new(username_key, password_key))
    }

    pub fn digest_auth(username_key: impl Into<String>, password_key: impl Into<String>) -> Self {
        Parameter::DigestAuth(Credentials::new(username_key, password_key))
    }

    pub fn proxy_auth(username_key: impl Into<String>, password_key: impl Into<String>) -> Self {
        Parameter::ProxyAuth(Credentials::new(username_key, password_key))
    }

    /// The bucket a field-style parameter writes into; `None` for auth kinds.
    pub fn bucket(&self) -> Option<Bucket> {
        match self {
            Parameter::Query(_) => Some(Bucket::Query),
            Parameter::Form(_) => Some(Bucket::Form),
            Parameter::Json(_) => Some(Bucket::Json),
            Parameter::Header(_) => Some(Bucket::Headers),
            Parameter::Cookie(_) => Some(Bucket::Cookies),
            Parameter::File(_) => Some(Bucket::Files),
            Parameter::UrlTemplate(_) => Some(Bucket::PendingUrlTemplates),
            Parameter::BasicAuth(_) | Parameter::DigestAuth(_) | Parameter::ProxyAuth(_) => None,
        }
    }

    /// Apply this parameter to `draft` using the call's arguments.
    ///
    /// Fails with `MissingRequiredParameter` before touching the draft when a
    /// required value is absent.
    pub fn apply(&self, draft: &mut RequestDraft, args: &Args) -> Result<(), Error> {
        match self {
            Parameter::BasicAuth(creds) => creds.apply(AuthScheme::Basic, draft, args),
            Parameter::DigestAuth(creds) => creds.apply(AuthScheme::Digest, draft, args),
            Parameter::ProxyAuth(creds) => creds.apply(AuthScheme::Proxy, draft, args),
            Parameter::Query(field) => field.apply(Bucket::Query, draft, args),
            Parameter::Form(field) => field.apply(Bucket::Form, draft, args),
            Parameter::Json(field) => field.apply(Bucket::Json, draft, args),
            Parameter::Header(field) => field.apply(Bucket::Headers, draft, args),
            Parameter::Cookie(field) => field.apply(Bucket::Cookies, draft, args),
            Parameter::File(field) => field.apply(Bucket::Files, draft, args),
            Parameter::UrlTemplate(field) => {
                field.apply(Bucket::PendingUrlTemplates, draft, args)?;
                draft.register_followup(Followup::ResolveUrlTemplate);
                Ok(())
            }
        }
    }
}

/// Apply `parameters` to `draft` in order, stopping at the first failure.
///
/// Later parameters overwrite values earlier ones wrote under the same
/// bucket and key. Nothing is rolled back on failure.
pub fn apply_parameters(parameters: &[Parameter], draft: &mut RequestDraft, args: &Args) -> Result<(), Error> {
    parameters.iter().try_for_each(|parameter| parameter.apply(draft, args))
}
