//! Error types for request composition.
//!
//! # Design
//! Errors raised while composing a request (missing arguments, bad URL
//! templates) get dedicated variants because callers act on them: they
//! point at a mistake in the call or in the endpoint definition. Failures
//! from the transport are boxed into `Transport` untouched, so callers can
//! downcast back to the concrete transport error.

/// Errors returned while building or dispatching a request.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A required parameter's source key was not supplied and it has no default.
    #[error("{key} is a required parameter, but was not passed a value and has no default")]
    MissingRequiredParameter { key: String },

    /// The URL template names a placeholder that no template parameter staged.
    #[error("URL template {template:?} references unresolved placeholder {{{name}}}")]
    UnresolvedPlaceholder { name: String, template: String },

    /// The URL template contains an unmatched `{` or `}`.
    #[error("malformed URL template {template:?}: unmatched brace")]
    MalformedTemplate { template: String },

    /// Call arguments did not serialize to a JSON object.
    #[error("call arguments must serialize to a JSON object, got {0}")]
    InvalidArguments(String),

    /// An HTTP method string that is not one of the supported verbs.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The client has no endpoint registered under this name.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// Configuration or call arguments could not be (de)serialized.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport failed to execute the request.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn transport<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Transport(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_names_the_key() {
        let err = Error::MissingRequiredParameter {
            key: "user_id".to_string(),
        };
        assert!(err.to_string().starts_with("user_id is a required parameter"));
    }

    #[test]
    fn unresolved_placeholder_shows_braces() {
        let err = Error::UnresolvedPlaceholder {
            name: "id".to_string(),
            template: "/users/{id}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "URL template \"/users/{id}\" references unresolved placeholder {id}"
        );
    }

    #[test]
    fn transport_error_downcasts() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = Error::transport(io);
        let Error::Transport(inner) = err else {
            panic!("expected transport error");
        };
        let io = inner.downcast_ref::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
    }
}
