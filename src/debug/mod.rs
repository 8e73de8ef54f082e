pub mod breakpoints;
pub mod handles;
pub mod idle;
pub mod manager;
pub mod notify;
pub mod projector;
pub mod session;
pub mod state;
pub mod ui;

pub use breakpoints::{BreakpointReconciler, TrackedBreakpoint};
pub use handles::{HandleTable, VariableNode};
pub use manager::SessionManager;
pub use notify::{Notification, Notifier};
pub use session::{DebugSession, LoopExit};
pub use state::{DebugState, Lifecycle};
pub use ui::DebuggerUi;
