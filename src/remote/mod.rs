//! Consumed capability: the remote debuggee client.
//!
//! Nothing in this module talks to the network. It only describes the
//! operations the session controller needs from the remote system and the
//! shapes of the data they exchange, so the controller can be driven by any
//! implementation (and by mocks in tests).

pub mod client;
pub mod error;
pub mod types;

pub use client::{PathResolver, RemoteClientFactory, RemoteDebugClient};
pub use error::{RemoteError, RemoteErrorKind, RemoteResult};
pub use types::*;
