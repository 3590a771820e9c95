use std::collections::HashMap;

/// Error type for all client operations.
///
/// Classification is carried structurally rather than by inspecting message
/// text: the three predicates below are derived from the variant, with truth
/// tables matching the upstream API's `access_deny` / validation / not-found
/// conventions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// A local precondition failed before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An empty result set where exactly one entity was expected.
    #[error("{0} not found")]
    NotFound(String),

    /// The `{code, message}` error envelope.
    #[error("API error (code={code}): {message} (status={status})")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The `{tamtam_response_api, codes, field_errors, error}` envelope.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    /// Non-2xx response whose body matched neither known envelope.
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// First failure of a sequential multi-target send, naming the target.
    /// Earlier successes are not rolled back.
    #[error("sending to chat {chat_id} failed: {source}")]
    Broadcast {
        chat_id: i64,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Unwrap the `Broadcast` wrapper so predicates see the underlying cause.
    fn cause(&self) -> &Error {
        match self {
            Error::Broadcast { source, .. } => source.cause(),
            other => other,
        }
    }

    /// True for API errors the server marks as `access_deny`.
    pub fn is_access_denied(&self) -> bool {
        match self.cause() {
            Error::Api { code, message, .. } => {
                code.contains("access_deny") || message.contains("access_deny")
            }
            _ => false,
        }
    }

    /// True for the per-field validation envelope.
    pub fn is_validation(&self) -> bool {
        matches!(self.cause(), Error::Validation { .. })
    }

    /// True when an entity lookup came back empty.
    pub fn is_not_found(&self) -> bool {
        matches!(self.cause(), Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn api(code: &str, message: &str) -> Error {
        Error::Api {
            status: 403,
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn access_denied_matches_code_or_message() {
        assert!(api("access_deny", "forbidden").is_access_denied());
        assert!(api("forbidden", "chat access_deny for bot").is_access_denied());
        assert!(!api("rate_limited", "slow down").is_access_denied());
        assert!(!Error::NotFound("chat with id 5".into()).is_access_denied());
    }

    #[test]
    fn validation_matches_only_validation_variant() {
        let err = Error::Validation {
            message: "bad payload".into(),
            field_errors: HashMap::new(),
        };
        assert!(err.is_validation());
        assert!(!err.is_not_found());
        assert!(!api("x", "y").is_validation());
    }

    #[test]
    fn not_found_matches_only_not_found_variant() {
        let err = Error::NotFound("user with id 7".into());
        assert!(err.is_not_found());
        assert!(!err.is_validation());
        assert!(!err.is_access_denied());
    }

    #[test]
    fn predicates_see_through_broadcast_wrapper() {
        let err = Error::Broadcast {
            chat_id: 11,
            source: Box::new(api("access_deny", "forbidden")),
        };
        assert!(err.is_access_denied());
        assert!(err.to_string().contains("chat 11"));
    }
}
