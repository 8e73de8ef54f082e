use crate::dap::Event;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

/// The remote debugger exposes a single thread.
pub const THREAD_ID: i32 = 1;

/// Push notification for the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Stopped { reason: String, thread_id: i32 },
    Terminated { restart: bool },
    /// Another client holds the debuggee; the UI is being asked to take over.
    TakeoverRequested { message: String },
}

impl Notification {
    pub fn stopped(reason: &str) -> Self {
        Notification::Stopped {
            reason: reason.to_string(),
            thread_id: THREAD_ID,
        }
    }

    pub fn to_event(&self, seq: i32) -> Event {
        let (event, body) = match self {
            Notification::Stopped { reason, thread_id } => (
                "stopped",
                json!({ "reason": reason, "threadId": thread_id, "allThreadsStopped": true }),
            ),
            Notification::Terminated { restart } => ("terminated", json!({ "restart": restart })),
            Notification::TakeoverRequested { message } => (
                "output",
                json!({ "category": "important", "output": message }),
            ),
        };
        Event {
            seq,
            event: event.to_string(),
            body: Some(body),
        }
    }
}

/// Single-consumer notification stream, delivered in emission order.
pub struct Notifier {
    tx: flume::Sender<Notification>,
    rx: Mutex<Option<flume::Receiver<Notification>>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
        }
    }

    /// Hand out the receiving end. Only the first caller gets it.
    pub async fn subscribe(&self) -> Option<flume::Receiver<Notification>> {
        self.rx.lock().await.take()
    }

    pub fn send(&self, notification: Notification) {
        debug!("Notifying front end: {:?}", notification);
        if self.tx.send(notification).is_err() {
            debug!("Notification dropped, subscriber is gone");
        }
    }
}
