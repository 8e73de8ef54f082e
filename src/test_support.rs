//! Mocks of the remote capability and UI seams shared by unit tests.

use crate::debug::DebuggerUi;
use crate::remote::*;
use crate::Result;
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Client {}

    #[async_trait::async_trait]
    impl RemoteDebugClient for Client {
        fn username(&self) -> String;
        fn is_logged_in(&self) -> bool;
        async fn set_stateful(&self, stateful: bool) -> RemoteResult<()>;
        async fn discovery(&self) -> RemoteResult<()>;
        async fn attach(
            &self,
            mode: DebuggingMode,
            debuggee_id: &str,
            username: &str,
            stop_on_exit: bool,
        ) -> RemoteResult<AttachInfo>;
        async fn listen(&self, scope: &ListenerScope) -> RemoteResult<ListenOutcome>;
        async fn delete_listener(&self, scope: &ListenerScope) -> RemoteResult<()>;
        async fn step(&self, step_type: StepType, target: Option<String>) -> RemoteResult<StepResult>;
        async fn stack_trace(&self, refresh_cache: bool) -> RemoteResult<StackTrace>;
        async fn go_to_stack(&self, target: &StackTarget) -> RemoteResult<()>;
        async fn child_variables(&self, parent_ids: &[String]) -> RemoteResult<ChildVariables>;
        async fn variables(&self, ids: &[String]) -> RemoteResult<Vec<RemoteVariable>>;
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
}

mock! {
    pub Resolver {}

    #[async_trait::async_trait]
    impl PathResolver for Resolver {
        async fn resolve_stack_uri(&self, uri: &str) -> Result<String>;
        async fn debuggable_object(&self, source_path: &str) -> Result<Option<DebuggableObject>>;
    }
}

mock! {
    pub Ui {}

    #[async_trait::async_trait]
    impl DebuggerUi for Ui {
        async fn confirm(&self, message: &str) -> bool;
        fn show_error(&self, message: &str);
    }
}

mock! {
    pub Factory {}

    #[async_trait::async_trait]
    impl RemoteClientFactory for Factory {
        async fn create(&self, conn_id: &str) -> Result<Arc<dyn RemoteDebugClient>>;
    }
}
