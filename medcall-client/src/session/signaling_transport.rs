use medcall_core::SignalMessage;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("signaling connection is closed")]
    Closed,
}

/// Outbound half of the connection to the relay.
pub trait SignalingTransport: Send + Sync {
    fn send(&self, msg: SignalMessage) -> Result<(), TransportError>;
}

/// Transport over an in-process channel, e.g. the outbound side of a
/// `LocalConnection` or a socket writer task.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<SignalMessage>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::UnboundedSender<SignalMessage>) -> Self {
        Self { tx }
    }
}

impl SignalingTransport for ChannelTransport {
    fn send(&self, msg: SignalMessage) -> Result<(), TransportError> {
        self.tx.send(msg).map_err(|_| TransportError::Closed)
    }
}
