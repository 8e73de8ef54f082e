//! Front end facing Debug Adapter Protocol shapes.
//!
//! Framing and sequencing of DAP messages belong to the front end transport;
//! this module only carries the bodies the session controller produces.

pub mod types;

pub use types::*;
