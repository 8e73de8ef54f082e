use crate::remote::RemoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// The session was logged out; no further remote calls are allowed.
    #[error("Debug session {0} has been disposed")]
    SessionKilled(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session already exists for connection: {0}")]
    SessionExists(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Terminal id error: {0}")]
    Terminal(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn error_code(&self) -> i32 {
        match self {
            Error::SessionNotFound(_) => -32001,
            Error::SessionExists(_) => -32002,
            Error::Remote(_) => -32003,
            Error::SessionKilled(_) => -32004,
            Error::Terminal(_) => -32005,
            Error::InvalidArgument(_) => -32602,
            Error::Internal(_) => -32603,
            Error::Io(_) | Error::Json(_) => -32603,
        }
    }

    /// The remote failure carried by this error, if any.
    pub fn remote(&self) -> Option<&RemoteError> {
        match self {
            Error::Remote(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_killed_is_distinct_from_remote_failure() {
        let killed = Error::SessionKilled("conn".to_string());
        let remote = Error::from(RemoteError::new("network down"));

        assert_ne!(killed.error_code(), remote.error_code());
        assert!(killed.remote().is_none());
        assert!(remote.remote().is_some());
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidArgument("stepRunToLine requires a target".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid argument: stepRunToLine requires a target"
        );
    }
}
