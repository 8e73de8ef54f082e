use super::session::{DebugSession, LoopExit};
use super::ui::DebuggerUi;
use crate::config::SessionConfig;
use crate::remote::{PathResolver, RemoteClientFactory};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Session Manager - one debug session per connection
pub struct SessionManager {
    factory: Arc<dyn RemoteClientFactory>,
    config: SessionConfig,
    sessions: Arc<RwLock<HashMap<String, Arc<DebugSession>>>>,
}

impl SessionManager {
    pub fn new(factory: Arc<dyn RemoteClientFactory>, config: SessionConfig) -> Self {
        Self {
            factory,
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn create_session(
        &self,
        conn_id: &str,
        resolver: Arc<dyn PathResolver>,
        ui: Arc<dyn DebuggerUi>,
    ) -> Result<Arc<DebugSession>> {
        if self.sessions.read().await.contains_key(conn_id) {
            return Err(Error::SessionExists(conn_id.to_string()));
        }

        let session = Arc::new(
            DebugSession::create(
                conn_id,
                self.factory.as_ref(),
                resolver,
                ui,
                self.config.clone(),
            )
            .await?,
        );

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(conn_id) {
            // lost a race with a concurrent create for the same connection
            drop(sessions);
            session.logout().await;
            return Err(Error::SessionExists(conn_id.to_string()));
        }
        sessions.insert(conn_id.to_string(), session.clone());
        Ok(session)
    }

    /// Run the listen loop of a session in the background.
    pub async fn start_session(&self, conn_id: &str) -> Result<JoinHandle<Result<LoopExit>>> {
        let session = self.get_session(conn_id).await?;
        let conn_id = conn_id.to_string();

        Ok(tokio::spawn(async move {
            let exit = session.start().await;
            match &exit {
                Ok(LoopExit::Stopped) => info!("Debug loop for {} stopped", conn_id),
                Ok(LoopExit::ListenerError(e)) => {
                    info!("Debug loop for {} needs a restart: {}", conn_id, e.message)
                }
                Err(e) => error!("Debug loop for {} failed: {}", conn_id, e),
            }
            exit
        }))
    }

    pub async fn get_session(&self, conn_id: &str) -> Result<Arc<DebugSession>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(conn_id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(conn_id.to_string()))
    }

    pub async fn list_sessions(&self) -> Vec<String> {
        let sessions = self.sessions.read().await;
        sessions.keys().cloned().collect()
    }

    /// Log the session out and forget it.
    pub async fn remove_session(&self, conn_id: &str) -> Result<()> {
        let session = self
            .sessions
            .write()
            .await
            .remove(conn_id)
            .ok_or_else(|| Error::SessionNotFound(conn_id.to_string()))?;

        session.logout().await;
        Ok(())
    }
}
