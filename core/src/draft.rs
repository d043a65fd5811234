//! The request draft parameters write into.
//!
//! # Design
//! A draft is owned by exactly one call. Parameters mutate it in order,
//! some of them register followups, and `finalize` runs those once every
//! parameter has had its turn. Only then does the draft turn into an
//! `HttpRequest`.
//!
//! Buckets are created lazily: a bucket that no parameter wrote to stays
//! absent, which is what the transport sees.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::trace;

use crate::auth::Auth;
use crate::error::Error;
use crate::http::{Args, HttpMethod, HttpRequest};
use crate::template;

/// A named facet of the request that parameters write key/value pairs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Query,
    Form,
    Json,
    Headers,
    Cookies,
    Files,
    /// Staged URL template values, consumed by `Followup::ResolveUrlTemplate`.
    PendingUrlTemplates,
}

/// Deferred work run after all parameters have applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    /// Substitute staged template values into the URL.
    ResolveUrlTemplate,
}

impl Followup {
    fn run(self, draft: &mut RequestDraft) -> Result<(), Error> {
        match self {
            Followup::ResolveUrlTemplate => {
                let vars = draft.take_bucket(Bucket::PendingUrlTemplates).unwrap_or_default();
                draft.url = template::resolve(&draft.url, &vars)?;
                Ok(())
            }
        }
    }
}

/// A partially built request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDraft {
    pub method: HttpMethod,
    pub url: String,
    buckets: BTreeMap<Bucket, Args>,
    auth: Option<Auth>,
    followups: Vec<Followup>,
}

impl RequestDraft {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            buckets: BTreeMap::new(),
            auth: None,
            followups: Vec::new(),
        }
    }

    pub fn bucket(&self, bucket: Bucket) -> Option<&Args> {
        self.buckets.get(&bucket)
    }

    /// Write `name = value` into `bucket`, creating the bucket if needed.
    pub fn insert(&mut self, bucket: Bucket, name: impl Into<String>, value: Value) {
        let name = name.into();
        trace!(?bucket, %name, "writing draft value");
        self.buckets.entry(bucket).or_default().insert(name, value);
    }

    pub fn take_bucket(&mut self, bucket: Bucket) -> Option<Args> {
        self.buckets.remove(&bucket)
    }

    pub fn auth(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }

    pub fn set_auth(&mut self, auth: Auth) {
        trace!(scheme = ?auth.scheme, "setting draft auth");
        self.auth = Some(auth);
    }

    /// Queue a followup. Registering the same kind twice keeps the first slot.
    pub fn register_followup(&mut self, followup: Followup) {
        if !self.followups.contains(&followup) {
            self.followups.push(followup);
        }
    }

    pub fn followups(&self) -> &[Followup] {
        &self.followups
    }

    /// Run and clear every registered followup, in registration order.
    pub fn finalize(&mut self) -> Result<(), Error> {
        for followup in std::mem::take(&mut self.followups) {
            trace!(?followup, "running followup");
            followup.run(self)?;
        }
        Ok(())
    }

    /// Turn the draft into a request description.
    ///
    /// Call `finalize` first; staged template values are dropped here.
    pub fn into_request(mut self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            url: self.url,
            query: self.buckets.remove(&Bucket::Query),
            form: self.buckets.remove(&Bucket::Form),
            json: self.buckets.remove(&Bucket::Json),
            headers: self.buckets.remove(&Bucket::Headers),
            cookies: self.buckets.remove(&Bucket::Cookies),
            files: self.buckets.remove(&Bucket::Files),
            auth: self.auth,
        }
    }
}
