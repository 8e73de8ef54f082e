use std::collections::HashMap;
use thiserror::Error;

/// Property carrying the protocol level sub-type of a remote failure.
pub const SUB_TYPE_PROPERTY: &str = "com.sap.adt.communicationFramework.subType";
/// Property carrying the human readable description of a debugger conflict.
pub const CONFLICT_TEXT_PROPERTY: &str = "conflictText";

const CONNECTION_TIMEOUT_SIGNATURE: &str = "connection timed out";

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Failure raised by a remote call.
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
    pub properties: HashMap<String, String>,
    /// Raw response body, when the failure came with one.
    pub body: Option<String>,
}

/// Recovery class of a remote failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Another client is already debugging the target.
    Conflict { text: Option<String> },
    AttachTimeout,
    DebuggeeEnded,
    Other,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_sub_type(self, sub_type: impl Into<String>) -> Self {
        self.with_property(SUB_TYPE_PROPERTY, sub_type)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn sub_type(&self) -> Option<&str> {
        self.properties
            .get(SUB_TYPE_PROPERTY)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Classify the failure. The sub-type tag wins; without one a connection
    /// timeout in the body means the attach window expired.
    pub fn kind(&self) -> RemoteErrorKind {
        match self.sub_type() {
            Some("conflictDetected") | Some("conflictNotification") => RemoteErrorKind::Conflict {
                text: self.properties.get(CONFLICT_TEXT_PROPERTY).cloned(),
            },
            Some("debuggeeEnded") => RemoteErrorKind::DebuggeeEnded,
            Some(_) => RemoteErrorKind::Other,
            None if self.is_connection_timeout() => RemoteErrorKind::AttachTimeout,
            None => RemoteErrorKind::Other,
        }
    }

    fn is_connection_timeout(&self) -> bool {
        self.body
            .as_deref()
            .unwrap_or(&self.message)
            .to_lowercase()
            .contains(CONNECTION_TIMEOUT_SIGNATURE)
    }
}
