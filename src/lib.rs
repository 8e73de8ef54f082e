pub mod config;
pub mod dap;
pub mod debug;
pub mod error;
pub mod remote;
pub mod terminal;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::SessionConfig;
pub use debug::{DebugSession, SessionManager};
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
