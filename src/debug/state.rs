use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Observable state of a session controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebugState {
    /// The listen loop has not been started.
    Idle,
    /// A listen call is outstanding and no debuggee is bound.
    Listening,
    /// A debuggee is bound and the front end is inspecting it.
    Stopped,
    /// A step request is outstanding.
    Stepping,
    /// The loop has exited. See [`Lifecycle::is_killed`] for disposal.
    Terminated,
}

/// Lifecycle flags of a session, shared between the listen loop and the
/// front end facing operations.
#[derive(Debug, Default)]
pub struct Lifecycle {
    started: AtomicBool,
    active: AtomicBool,
    attached: AtomicBool,
    killed: AtomicBool,
    listening: AtomicBool,
    stepping: AtomicBool,
}

macro_rules! flag {
    ($get:ident, $set:ident, $field:ident) => {
        pub fn $get(&self) -> bool {
            self.$field.load(Ordering::SeqCst)
        }

        pub fn $set(&self, value: bool) {
            self.$field.store(value, Ordering::SeqCst);
        }
    };
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    flag!(is_started, set_started, started);
    flag!(is_active, set_active, active);
    flag!(is_attached, set_attached, attached);
    flag!(is_listening, set_listening, listening);
    flag!(is_stepping, set_stepping, stepping);

    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    /// Mark the session disposed. There is no way back.
    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
    }

    /// Mark a listen call as outstanding, then confirm the loop should still
    /// run. A stop observed here clears the mark again, so a stopper either
    /// sees the listen and deletes the listener, or the listen never starts.
    pub fn begin_listen(&self) -> bool {
        self.listening.store(true, Ordering::SeqCst);
        if self.active.load(Ordering::SeqCst) {
            return true;
        }
        self.listening.store(false, Ordering::SeqCst);
        false
    }

    pub fn state(&self) -> DebugState {
        if !self.is_started() {
            return DebugState::Idle;
        }
        if self.is_killed() || !self.is_active() {
            return DebugState::Terminated;
        }
        if self.is_stepping() {
            DebugState::Stepping
        } else if self.is_attached() {
            DebugState::Stopped
        } else {
            DebugState::Listening
        }
    }
}
