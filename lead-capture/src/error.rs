//! Failure taxonomy for a submission.

use thiserror::Error;

/// Shown when the email field is empty.
pub const VALIDATION_MESSAGE: &str = "Please enter a valid email address";

/// Shown when a failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An error occurred while analyzing the email. Please try again.";

/// Errors that can end a submission.
///
/// `Validation` never reaches the network. The other three are collapsed
/// into a single failed state with a best-effort message; none are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The email field was empty after trimming
    #[error("email is required")]
    Validation,

    /// The request could not be sent or its body could not be read
    #[error("request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status
    #[error("analysis endpoint returned status {status}")]
    Server {
        /// HTTP status code
        status: u16,
        /// The body's `error` field, if it had one
        message: Option<String>,
    },

    /// The response body was not the expected JSON
    #[error("response parsing failed: {0}")]
    Parse(String),
}

impl AnalysisError {
    /// Message to show the visitor
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation => VALIDATION_MESSAGE,
            Self::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }

    /// Short label for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Transport(_) => "transport",
            Self::Server { .. } => "server",
            Self::Parse(_) => "parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_surfaced() {
        let error = AnalysisError::Server {
            status: 400,
            message: Some("Email is required".to_string()),
        };
        assert_eq!(error.user_message(), "Email is required");
        assert_eq!(error.kind(), "server");
    }

    #[test]
    fn missing_or_blank_server_message_falls_back() {
        let missing = AnalysisError::Server {
            status: 500,
            message: None,
        };
        let blank = AnalysisError::Server {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(missing.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(blank.user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn transport_and_parse_use_generic_message() {
        assert_eq!(
            AnalysisError::Transport("offline".into()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(
            AnalysisError::Parse("expected value".into()).user_message(),
            GENERIC_FAILURE_MESSAGE
        );
        assert_eq!(AnalysisError::Validation.user_message(), VALIDATION_MESSAGE);
    }
}
