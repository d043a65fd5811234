//! Test doubles shared by the unit tests.

use std::sync::Mutex;

use crate::http::HttpRequest;
use crate::transport::Transport;

#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub struct RecordedFailure(String);

/// Records every dispatched request and echoes it back as the response.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<HttpRequest>>,
    failure: Option<String>,
}

impl RecordingTransport {
    /// A transport whose every dispatch fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            sent: Mutex::default(),
            failure: Some(message.to_string()),
        }
    }

    /// Drain the recorded requests.
    pub fn take(&self) -> Vec<HttpRequest> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }
}

impl Transport for RecordingTransport {
    type Response = HttpRequest;
    type Error = RecordedFailure;

    fn dispatch(&self, request: &HttpRequest) -> Result<HttpRequest, RecordedFailure> {
        if let Some(message) = &self.failure {
            return Err(RecordedFailure(message.clone()));
        }
        self.sent.lock().unwrap().push(request.clone());
        Ok(request.clone())
    }
}
