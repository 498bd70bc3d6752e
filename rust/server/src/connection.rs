use crate::errors::ConnectionError;
use crate::events::Envelope;
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Per-player transport as seen by the match.
///
/// Identity, admin status, hand and won cards are match state and live in the
/// engine; a connection only has to deliver messages and let go when asked.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn send(&self, envelope: &Envelope) -> Result<(), ConnectionError>;

    async fn release(&self) -> Result<(), ConnectionError>;
}

pub type ConnectionReceiver = mpsc::UnboundedReceiver<Envelope>;

/// In-process connection: every envelope lands on an mpsc channel.
///
/// Releasing drops the sending half, so the receiver drains what was already
/// delivered and then yields `None`.
#[derive(Debug)]
pub struct ChannelConnection {
    sender: Mutex<Option<mpsc::UnboundedSender<Envelope>>>,
}

impl ChannelConnection {
    pub fn new() -> (Self, ConnectionReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    pub fn is_released(&self) -> bool {
        self.sender.lock().map(|guard| guard.is_none()).unwrap_or(true)
    }

    fn sender(&self) -> Result<mpsc::UnboundedSender<Envelope>, ConnectionError> {
        let guard = self
            .sender
            .lock()
            .map_err(|_| ConnectionError::Transport("connection lock poisoned".into()))?;
        guard.clone().ok_or(ConnectionError::Closed)
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    async fn send(&self, envelope: &Envelope) -> Result<(), ConnectionError> {
        self.sender()?
            .send(envelope.clone())
            .map_err(|_| ConnectionError::Closed)
    }

    async fn release(&self) -> Result<(), ConnectionError> {
        let mut guard = self
            .sender
            .lock()
            .map_err(|_| ConnectionError::Transport("connection lock poisoned".into()))?;
        guard.take().map(drop).ok_or(ConnectionError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ServerMessage;

    #[tokio::test]
    async fn delivers_until_released() {
        let (conn, mut rx) = ChannelConnection::new();
        conn.send(&Envelope::new(ServerMessage::Started, 1))
            .await
            .expect("deliver");
        conn.release().await.expect("release");

        assert!(conn.is_released());
        assert_eq!(rx.recv().await.map(|e| e.message), Some(ServerMessage::Started));
        assert!(rx.recv().await.is_none());

        let err = conn
            .send(&Envelope::new(ServerMessage::Started, 1))
            .await
            .unwrap_err();
        assert_eq!(err, ConnectionError::Closed);
        assert_eq!(conn.release().await, Err(ConnectionError::Closed));
    }

    #[tokio::test]
    async fn dropped_receiver_reports_closed() {
        let (conn, rx) = ChannelConnection::new();
        drop(rx);
        let err = conn
            .send(&Envelope::new(ServerMessage::Promoted, 0))
            .await
            .unwrap_err();
        assert_eq!(err, ConnectionError::Closed);
    }
}
