use super::error::RemoteResult;
use super::types::*;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Operations the session controller needs from the remote debugger.
///
/// Listener side calls (`listen`, `delete_listener`, `set_breakpoints`,
/// `delete_breakpoint`) must not share the stateful connection used by the
/// stepping and variable calls: `listen` blocks until a breakpoint is hit or
/// the listener is deleted.
#[async_trait]
pub trait RemoteDebugClient: Send + Sync {
    /// Remote user the client is logged in as.
    fn username(&self) -> String;

    fn is_logged_in(&self) -> bool;

    /// Switch the main connection between stateful and stateless sessions.
    async fn set_stateful(&self, stateful: bool) -> RemoteResult<()>;

    /// Core discovery call, required once before any debugger call.
    async fn discovery(&self) -> RemoteResult<()>;

    async fn attach(
        &self,
        mode: DebuggingMode,
        debuggee_id: &str,
        username: &str,
        stop_on_exit: bool,
    ) -> RemoteResult<AttachInfo>;

    /// Long poll. Blocks until a debuggee is available or the listener is deleted.
    async fn listen(&self, scope: &ListenerScope) -> RemoteResult<ListenOutcome>;

    async fn delete_listener(&self, scope: &ListenerScope) -> RemoteResult<()>;

    async fn step(&self, step_type: StepType, target: Option<String>) -> RemoteResult<StepResult>;

    async fn stack_trace(&self, refresh_cache: bool) -> RemoteResult<StackTrace>;

    async fn go_to_stack(&self, target: &StackTarget) -> RemoteResult<()>;

    async fn child_variables(&self, parent_ids: &[String]) -> RemoteResult<ChildVariables>;

    async fn variables(&self, ids: &[String]) -> RemoteResult<Vec<RemoteVariable>>;

    /// Replaces every breakpoint previously registered under `client_id`.
    async fn set_breakpoints(
        &self,
        scope: &ListenerScope,
        client_id: &str,
        requests: &[String],
    ) -> RemoteResult<Vec<RemoteBreakpoint>>;

    async fn delete_breakpoint(&self, token: &str, scope: &ListenerScope) -> RemoteResult<()>;

    async fn save_settings(&self, settings: &DebugSettings) -> RemoteResult<()>;

    async fn drop_session(&self) -> RemoteResult<()>;

    async fn logout(&self) -> RemoteResult<()>;
}

/// Creates remote clients for a connection id.
#[async_trait]
pub trait RemoteClientFactory: Send + Sync {
    async fn create(&self, conn_id: &str) -> Result<Arc<dyn RemoteDebugClient>>;
}

/// Maps remote object locations to paths the front end can open, and back.
#[async_trait]
pub trait PathResolver: Send + Sync {
    /// Display path for the object relative location of a stack frame.
    async fn resolve_stack_uri(&self, uri: &str) -> Result<String>;

    /// Workspace object behind a source path, if it is one breakpoints can be set on.
    async fn debuggable_object(&self, source_path: &str) -> Result<Option<DebuggableObject>>;
}
