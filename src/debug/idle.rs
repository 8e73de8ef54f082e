use crate::remote::RemoteDebugClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Variable read used to reset the remote idle clock. The result is ignored.
pub const PROBE_VARIABLE: &str = "SY-SUBRC";

/// One-shot heartbeat that keeps an attached debuggee from expiring while
/// the front end is idle. At most one timer is pending at a time.
///
/// The probe runs under the session's stateful guard, so it never interleaves
/// with another call on the same remote binding.
pub struct IdleRefresh {
    delay: Duration,
    stateful: Arc<Mutex<()>>,
    closed: AtomicBool,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl IdleRefresh {
    pub fn new(delay: Duration, stateful: Arc<Mutex<()>>) -> Self {
        Self {
            delay,
            stateful,
            closed: AtomicBool::new(false),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a probe after the configured delay, replacing any pending one.
    /// Does nothing once [`close`](IdleRefresh::close) has been called.
    pub async fn arm(&self, client: Arc<dyn RemoteDebugClient>) {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        if self.closed.load(Ordering::SeqCst) {
            debug!("Idle refresh is closed, not arming");
            return;
        }

        let delay = self.delay;
        let stateful = self.stateful.clone();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _guard = stateful.lock().await;
            probe(client.as_ref()).await;
        }));
    }

    /// Cancel the pending timer without firing it. Returns whether one was pending.
    pub async fn disarm(&self) -> bool {
        match self.pending.lock().await.take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    /// Disarm for good: later calls to [`arm`](IdleRefresh::arm) are ignored.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.disarm().await;
    }

    pub async fn is_armed(&self) -> bool {
        self.pending
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// Lightweight remote read that only resets the remote idle clock.
pub async fn probe(client: &dyn RemoteDebugClient) {
    debug!("Idle refresh probe");
    if let Err(e) = client.variables(&[PROBE_VARIABLE.to_string()]).await {
        debug!("Idle refresh probe failed: {}", e);
    }
}
