//! Connection session: the registry-side half of one live client.
//!
//! A session is opened as a pair. [`ConnectionSession`] is installed in the
//! registry and used by producers to enqueue encoded frames, while
//! [`SessionMailbox`] is owned by the connection's send loop and drains them.

use std::sync::Arc;

use tokio::sync::{Notify, mpsc, mpsc::error::TrySendError};
use uuid::Uuid;

use super::{Handle, MessagePushError};

/// Default capacity of the outbound queue
pub const DEFAULT_OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Identifies one physical connection (a handle may reconnect many times)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Producer side of a live connection
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    id: SessionId,
    handle: Handle,
    sender: mpsc::Sender<String>,
    close_signal: Arc<Notify>,
}

/// Consumer side of a live connection, owned by the send loop
#[derive(Debug)]
pub struct SessionMailbox {
    pub id: SessionId,
    pub receiver: mpsc::Receiver<String>,
    pub close_signal: Arc<Notify>,
}

impl ConnectionSession {
    /// Open a new session with a bounded outbound queue of `capacity` frames.
    pub fn open(handle: Handle, capacity: usize) -> (Self, SessionMailbox) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let close_signal = Arc::new(Notify::new());
        let id = SessionId::generate();

        let session = Self {
            id,
            handle,
            sender,
            close_signal: close_signal.clone(),
        };
        let mailbox = SessionMailbox {
            id,
            receiver,
            close_signal,
        };
        (session, mailbox)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Enqueue an encoded frame without waiting.
    ///
    /// A full queue is reported as [`MessagePushError::QueueFull`]; the caller
    /// treats it as a dead client.
    pub fn try_push(&self, frame: String) -> Result<(), MessagePushError> {
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => MessagePushError::QueueFull(self.handle.to_string()),
            TrySendError::Closed(_) => MessagePushError::Closed(self.handle.to_string()),
        })
    }

    /// Signal the connection's loops to stop. Does not wait for them.
    pub fn close(&self) {
        self.close_signal.notify_one();
    }
}
