//! Gateway error type.
//!
//! Every failure, whether the backend said no or the socket died, ends up as
//! one user-facing message via [`GatewayError::display_message`].

use thiserror::Error;

use crate::types::Operation;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend answered with `"status": "error"`.
    #[error("backend rejected request: {}", .message.as_deref().unwrap_or("<no message>"))]
    Rejected { message: Option<String> },
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("connection closed by backend")]
    Closed,
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Malformed(e.to_string())
    }
}

impl GatewayError {
    pub fn rejected(message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            message: Some(message.into()),
        }
    }

    /// Text to show the user for a failed `op`.
    ///
    /// Backend messages are surfaced verbatim; everything else (transport
    /// failures, rejections without a message) gets the operation's default.
    pub fn display_message(&self, op: Operation) -> String {
        match self {
            GatewayError::Rejected {
                message: Some(message),
            } if !message.trim().is_empty() => message.clone(),
            _ => op.default_failure_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_is_surfaced_verbatim() {
        let e = GatewayError::rejected("Maximum undos reached (3)");
        assert_eq!(e.display_message(Operation::Undo), "Maximum undos reached (3)");
    }

    #[test]
    fn missing_message_falls_back_to_default() {
        let e = GatewayError::Rejected { message: None };
        assert_eq!(e.display_message(Operation::Move), "Move failed");

        let e = GatewayError::rejected("   ");
        assert_eq!(e.display_message(Operation::Hint), "Failed to get hint");
    }

    #[test]
    fn transport_failures_use_default() {
        let e = GatewayError::Timeout(5000);
        assert_eq!(e.display_message(Operation::NewGame), "Failed to create game");

        let e: GatewayError = std::io::Error::from(std::io::ErrorKind::ConnectionRefused).into();
        assert_eq!(e.display_message(Operation::Undo), "Undo failed");
    }
}
