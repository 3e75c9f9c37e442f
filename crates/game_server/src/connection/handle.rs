//! Outbound handles to a client connection.
//!
//! Every connection owns an unbounded queue drained by its writer task.
//! [`ConnectionHandle`] is the strong end: the connection task holds it for
//! as long as the socket is read, and handlers borrow it to reply.
//! [`WeakConnectionHandle`] is what a Player keeps. It never keeps the
//! connection alive and must be upgraded (which checks liveness) before
//! every push.

use super::ConnectionId;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio_tungstenite::tungstenite::Message;

/// A push or reply could not be queued because the connection is gone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("connection {0} is closed")]
pub struct ConnectionClosed(pub ConnectionId);

/// Strong, cloneable sender for one connection's outbound queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    sender: UnboundedSender<Message>,
}

impl ConnectionHandle {
    /// Creates a handle and the receiving end its writer task drains.
    pub fn channel(id: ConnectionId) -> (Self, UnboundedReceiver<Message>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { id, sender }, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// True while the writer side still receives.
    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Queues a text frame. Never waits on the socket.
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), ConnectionClosed> {
        let text: String = text.into();
        self.send(Message::Text(text.into()))
    }

    /// Queues any frame.
    pub fn send(&self, message: Message) -> Result<(), ConnectionClosed> {
        self.sender.send(message).map_err(|_| ConnectionClosed(self.id))
    }

    /// A reference that does not keep the connection alive.
    pub fn downgrade(&self) -> WeakConnectionHandle {
        WeakConnectionHandle {
            id: self.id,
            sender: self.sender.downgrade(),
        }
    }
}

/// Non-owning reference to a connection.
#[derive(Debug, Clone)]
pub struct WeakConnectionHandle {
    id: ConnectionId,
    sender: WeakUnboundedSender<Message>,
}

impl WeakConnectionHandle {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns a usable handle if the connection is still open.
    pub fn upgrade(&self) -> Option<ConnectionHandle> {
        let sender = self.sender.upgrade()?;
        let handle = ConnectionHandle { id: self.id, sender };
        handle.is_open().then_some(handle)
    }
}
