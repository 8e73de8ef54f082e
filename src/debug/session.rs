//! Debug Session Controller
//!
//! Bridges a front end to a remote, session-stateful debugger that is only
//! reachable through a long-poll listener.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start──▶ Listening ──debuggee──▶ Stopped ──step──▶ Stepping
//!                    ▲                       │  ▲              │
//!                    └───────────────────────┘  └──────────────┘
//! any ──stop / fatal error──▶ Terminated        any ──logout──▶ killed
//! ```
//!
//! The listen loop keeps polling while a debuggee is bound: the next
//! breakpoint hit arrives through the same loop. Attaching happens only once
//! per bind; a "debuggee ended" failure while stepping drops the bind so the
//! next debuggee is attached afresh.
//!
//! # Failure classes
//!
//! Listen failures are classified, not propagated:
//!
//! - **conflict**: the UI is asked to take over. Yes deletes the listener
//!   registration and polls again, no terminates (without disposing).
//! - **attach timeout**: an idle probe fires and polling continues.
//! - **anything else**: the error is shown and the session terminates.
//!
//! Once [`DebugSession::logout`] has started, every remote-touching call fails
//! with [`Error::SessionKilled`].

use super::breakpoints::BreakpointReconciler;
use super::idle::{self, IdleRefresh};
use super::notify::{Notification, Notifier};
use super::projector::Projector;
use super::state::{DebugState, Lifecycle};
use super::ui::DebuggerUi;
use crate::config::SessionConfig;
use crate::dap::{Breakpoint, EvaluateResult, Scope, Source, SourceBreakpoint, StackFrame, Variable};
use crate::remote::{
    DebugSettings, Debuggee, ListenOutcome, ListenerError, ListenerScope, PathResolver,
    RemoteClientFactory, RemoteDebugClient, RemoteError, RemoteErrorKind, StepResult, StepType,
};
use crate::terminal::{ide_id, TerminalIdStore};
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const DEFAULT_CONFLICT_TEXT: &str = "Debugger conflict detected";

/// Why [`DebugSession::start`] returned.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopExit {
    /// The session was stopped, terminated or disposed.
    Stopped,
    /// The remote listener reported a protocol error. The caller decides
    /// whether to start the loop again.
    ListenerError(ListenerError),
}

pub struct DebugSession {
    pub conn_id: String,
    client: Arc<dyn RemoteDebugClient>,
    resolver: Arc<dyn PathResolver>,
    ui: Arc<dyn DebuggerUi>,
    config: SessionConfig,
    terminal_id: String,
    ide_id: String,
    username: String,
    lifecycle: Lifecycle,
    projector: Projector,
    breakpoints: BreakpointReconciler,
    idle: IdleRefresh,
    notifier: Notifier,
    /// Serializes calls on the stateful remote binding.
    stateful: Arc<Mutex<()>>,
}

impl DebugSession {
    pub fn new(
        conn_id: impl Into<String>,
        client: Arc<dyn RemoteDebugClient>,
        resolver: Arc<dyn PathResolver>,
        ui: Arc<dyn DebuggerUi>,
        terminal_id: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        let conn_id = conn_id.into();
        let username = client.username().to_uppercase();
        let stateful = Arc::new(Mutex::new(()));

        Self {
            ide_id: ide_id(&conn_id),
            idle: IdleRefresh::new(config.idle_refresh_delay(), stateful.clone()),
            conn_id,
            client,
            resolver,
            ui,
            config,
            terminal_id: terminal_id.into(),
            username,
            lifecycle: Lifecycle::new(),
            projector: Projector::new(),
            breakpoints: BreakpointReconciler::new(),
            notifier: Notifier::new(),
            stateful,
        }
    }

    /// Create the remote client for `conn_id`, switch it to a stateful
    /// session and read (or create) the terminal id.
    pub async fn create(
        conn_id: &str,
        factory: &dyn RemoteClientFactory,
        resolver: Arc<dyn PathResolver>,
        ui: Arc<dyn DebuggerUi>,
        config: SessionConfig,
    ) -> Result<Self> {
        let client = factory.create(conn_id).await?;
        client.set_stateful(true).await?;
        client.discovery().await?;

        let terminal_id = TerminalIdStore::new(config.terminal_id_path())
            .get_or_create()
            .await?;
        info!("Debug session created for {}", conn_id);

        Ok(Self::new(conn_id, client, resolver, ui, terminal_id, config))
    }

    fn scope(&self) -> ListenerScope {
        ListenerScope {
            mode: self.config.mode,
            terminal_id: self.terminal_id.clone(),
            ide_id: self.ide_id.clone(),
            username: self.username.clone(),
        }
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.lifecycle.is_killed() {
            return Err(Error::SessionKilled(self.conn_id.clone()));
        }
        Ok(())
    }

    pub fn terminal_id(&self) -> &str {
        &self.terminal_id
    }

    pub fn ide_id(&self) -> &str {
        &self.ide_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn state(&self) -> DebugState {
        self.lifecycle.state()
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn is_attached(&self) -> bool {
        self.lifecycle.is_attached()
    }

    pub fn is_killed(&self) -> bool {
        self.lifecycle.is_killed()
    }

    /// A listen call is outstanding.
    pub fn is_listening(&self) -> bool {
        self.lifecycle.is_listening()
    }

    /// The notification stream. Only the first caller receives it.
    pub async fn subscribe(&self) -> Option<flume::Receiver<Notification>> {
        self.notifier.subscribe().await
    }

    /// Run the listen loop until the session stops or the listener reports
    /// a protocol error.
    pub async fn start(&self) -> Result<LoopExit> {
        self.ensure_alive()?;
        self.lifecycle.set_started(true);
        self.lifecycle.set_active(true);
        let scope = self.scope();
        info!(
            "Listening for debuggees on {} ({} mode)",
            self.conn_id,
            scope.mode.as_str()
        );

        while self.lifecycle.begin_listen() {
            let outcome = self.client.listen(&scope).await;
            self.lifecycle.set_listening(false);

            match outcome {
                Ok(ListenOutcome::Idle) => debug!("Listener returned without debuggee"),
                Ok(ListenOutcome::Debuggee(debuggee)) => {
                    if !self.lifecycle.is_active() {
                        break;
                    }
                    self.on_breakpoint_reached(debuggee).await;
                }
                Ok(ListenOutcome::ListenerError(e)) => {
                    warn!("Listener error on {}: {} ({})", self.conn_id, e.message, e.kind);
                    return Ok(LoopExit::ListenerError(e));
                }
                Err(e) => {
                    if !self.lifecycle.is_active() {
                        break;
                    }
                    self.on_listen_error(e).await;
                }
            }
        }

        info!("Listen loop for {} exited", self.conn_id);
        Ok(LoopExit::Stopped)
    }

    async fn on_breakpoint_reached(&self, debuggee: Debuggee) {
        info!("Debuggee {} reached a breakpoint", debuggee.debuggee_id);
        match self.attach(&debuggee).await {
            Ok(()) if self.lifecycle.is_active() => {
                self.notifier.send(Notification::stopped("breakpoint"));
                self.arm_idle().await;
            }
            Ok(()) => debug!("Session stopped while attaching {}", debuggee.debuggee_id),
            Err(Error::SessionKilled(_)) => {
                debug!("Session disposed while attaching {}", debuggee.debuggee_id)
            }
            Err(e) => {
                error!("Failed to attach to debuggee {}: {}", debuggee.debuggee_id, e);
                self.terminate().await;
            }
        }
    }

    /// Bind the debuggee and refresh the projection. Stops early once the
    /// session is stopped, and fails once it is disposed.
    async fn attach(&self, debuggee: &Debuggee) -> Result<()> {
        let _guard = self.stateful.lock().await;
        self.ensure_alive()?;
        if !self.lifecycle.is_attached() {
            let info = self
                .client
                .attach(
                    self.config.mode,
                    &debuggee.debuggee_id,
                    &self.username,
                    self.config.stop_on_exit,
                )
                .await?;
            debug!("Attached, reached breakpoints: {:?}", info.reached_breakpoints);
            self.lifecycle.set_attached(true);
            self.ensure_alive()?;
        }
        if !self.lifecycle.is_active() {
            return Ok(());
        }
        self.client.save_settings(&DebugSettings::default()).await?;
        self.ensure_alive()?;
        self.projector
            .update_stack(self.client.as_ref(), self.resolver.as_ref())
            .await
    }

    /// Arm the idle timer unless the session has stopped. A stop racing
    /// with the arm disarms again, so no timer outlives a termination.
    async fn arm_idle(&self) {
        if !self.lifecycle.is_active() {
            return;
        }
        self.idle.arm(self.client.clone()).await;
        if !self.lifecycle.is_active() {
            self.idle.disarm().await;
        }
    }

    async fn on_listen_error(&self, e: RemoteError) {
        match e.kind() {
            RemoteErrorKind::Conflict { text } => {
                let message = format!(
                    "{} Take over debugging?",
                    text.as_deref().unwrap_or(DEFAULT_CONFLICT_TEXT)
                );
                warn!("Debugger conflict on {}", self.conn_id);
                self.notifier.send(Notification::TakeoverRequested {
                    message: message.clone(),
                });

                if self.ui.confirm(&message).await {
                    info!("Taking over debugging on {}", self.conn_id);
                    if let Err(e) = self.client.delete_listener(&self.scope()).await {
                        warn!("Failed to delete listener for takeover: {}", e);
                    }
                } else {
                    info!("Takeover declined on {}", self.conn_id);
                    self.terminate().await;
                }
            }
            RemoteErrorKind::AttachTimeout => {
                debug!("Attach timed out on {}, refreshing", self.conn_id);
                let _guard = self.stateful.lock().await;
                idle::probe(self.client.as_ref()).await;
            }
            RemoteErrorKind::DebuggeeEnded | RemoteErrorKind::Other => {
                error!("Error listening to debugger on {}: {}", self.conn_id, e);
                self.ui
                    .show_error(&format!("Error listening to debugger: {}", e));
                self.terminate().await;
            }
        }
    }

    /// Leave the listen loop and tell the front end. Does not dispose the session.
    async fn terminate(&self) {
        self.lifecycle.set_active(false);
        self.idle.disarm().await;
        self.notifier.send(Notification::Terminated { restart: false });
    }

    /// Stop the listen loop, unblocking an outstanding listen call.
    pub async fn stop_debugging(&self) -> Result<()> {
        self.ensure_alive()?;
        self.terminate().await;
        if self.lifecycle.is_listening() {
            if let Err(e) = self.client.delete_listener(&self.scope()).await {
                warn!("Failed to delete listener on {}: {}", self.conn_id, e);
            }
        }
        Ok(())
    }

    /// Step the bound debuggee.
    ///
    /// Returns `Ok(None)` when the remote side rejected the step; the failure
    /// has already been handled (shown to the user, or the bind dropped if
    /// the debuggee ended).
    pub async fn step(&self, step_type: StepType, target: Option<String>) -> Result<Option<StepResult>> {
        self.ensure_alive()?;
        if step_type.requires_target() && target.as_deref().map_or(true, str::is_empty) {
            return Err(Error::InvalidArgument(format!(
                "{} requires a target",
                step_type.as_str()
            )));
        }
        self.idle.disarm().await;

        let _guard = self.stateful.lock().await;
        self.ensure_alive()?;
        self.lifecycle.set_stepping(true);
        let result = self.step_and_refresh(step_type, target).await;
        self.lifecycle.set_stepping(false);

        match result {
            Ok(res) => {
                self.ensure_alive()?;
                self.notifier.send(Notification::stopped("step"));
                self.arm_idle().await;
                Ok(Some(res))
            }
            Err(e @ Error::SessionKilled(_)) => Err(e),
            Err(e) if e.remote().map(RemoteError::kind) == Some(RemoteErrorKind::DebuggeeEnded) => {
                info!("Debuggee ended on {}", self.conn_id);
                self.on_debuggee_ended().await;
                Ok(None)
            }
            Err(e) => {
                warn!("{} failed on {}: {}", step_type.as_str(), self.conn_id, e);
                self.ui.show_error(&e.to_string());
                Ok(None)
            }
        }
    }

    async fn step_and_refresh(&self, step_type: StepType, target: Option<String>) -> Result<StepResult> {
        let res = self.client.step(step_type, target).await?;
        self.ensure_alive()?;
        self.projector
            .update_stack(self.client.as_ref(), self.resolver.as_ref())
            .await?;
        Ok(res)
    }

    async fn on_debuggee_ended(&self) {
        if self.lifecycle.is_killed() {
            return;
        }
        if let Err(e) = self.client.drop_session().await {
            warn!("Failed to drop remote session: {}", e);
        }
        if let Err(e) = self.client.set_stateful(true).await {
            warn!("Failed to re-establish stateful session: {}", e);
        }
        self.lifecycle.set_attached(false);
        self.projector.clear().await;
    }

    pub async fn get_stack(&self) -> Vec<StackFrame> {
        self.projector.stack().await
    }

    pub async fn get_scopes(&self, frame_id: i32) -> Result<Vec<Scope>> {
        self.ensure_alive()?;
        let _guard = self.stateful.lock().await;
        self.projector.get_scopes(self.client.as_ref(), frame_id).await
    }

    pub async fn get_variables(&self, handle: i32) -> Result<Vec<Variable>> {
        self.ensure_alive()?;
        let _guard = self.stateful.lock().await;
        self.projector.get_variables(self.client.as_ref(), handle).await
    }

    pub async fn evaluate(&self, expression: &str) -> Result<Option<EvaluateResult>> {
        self.ensure_alive()?;
        let _guard = self.stateful.lock().await;
        self.projector.evaluate(self.client.as_ref(), expression).await
    }

    pub async fn set_breakpoints(&self, source: &Source, breakpoints: &[SourceBreakpoint]) -> Result<Vec<Breakpoint>> {
        self.ensure_alive()?;
        Ok(self
            .breakpoints
            .set_breakpoints(
                &self.conn_id,
                self.client.as_ref(),
                self.resolver.as_ref(),
                &self.scope(),
                source,
                breakpoints,
            )
            .await)
    }

    pub async fn get_breakpoints(&self, path: &str) -> Vec<Breakpoint> {
        self.breakpoints.get_breakpoints(path).await
    }

    /// Dispose the session.
    ///
    /// Deletes every verified breakpoint and the listener, then drops the
    /// remote session and logs out. Individual failures are logged and
    /// skipped. Calling it again is a no-op.
    pub async fn logout(&self) {
        if self.lifecycle.is_killed() {
            return;
        }
        info!("Logging out debug session {}", self.conn_id);
        self.lifecycle.kill();
        self.idle.close().await;
        let scope = self.scope();

        let mut deletions = JoinSet::new();
        for token in self.breakpoints.remote_tokens().await {
            let client = self.client.clone();
            let scope = scope.clone();
            deletions.spawn(async move {
                if let Err(e) = client.delete_breakpoint(&token, &scope).await {
                    warn!("Failed to delete breakpoint {}: {}", token, e);
                }
            });
        }

        let stop_listener = async {
            if self.lifecycle.is_listening() {
                if let Err(e) = self.client.delete_listener(&scope).await {
                    warn!("Failed to delete listener on {}: {}", self.conn_id, e);
                }
            }
        };
        let delete_breakpoints = async {
            while let Some(joined) = deletions.join_next().await {
                if let Err(e) = joined {
                    warn!("Breakpoint deletion task failed: {}", e);
                }
            }
        };
        tokio::join!(stop_listener, delete_breakpoints);

        if self.client.is_logged_in() {
            if let Err(e) = self.client.drop_session().await {
                debug!("Failed to drop remote session: {}", e);
            }
            if let Err(e) = self.client.logout().await {
                debug!("Failed to log out: {}", e);
            }
        }
        info!("Debug session {} disposed", self.conn_id);
    }
}
