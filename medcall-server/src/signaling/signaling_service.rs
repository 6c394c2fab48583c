use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use dashmap::DashMap;
use medcall_core::{ParticipantId, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

struct SignalingInner {
    peers: DashMap<ParticipantId, mpsc::UnboundedSender<SignalMessage>>,
}

/// Registry of open client connections.
///
/// Each connection task registers the sending half of its outbound queue;
/// serialization to the wire happens in that task.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
            }),
        }
    }

    pub fn add_peer(&self, participant_id: ParticipantId, tx: mpsc::UnboundedSender<SignalMessage>) {
        self.inner.peers.insert(participant_id, tx);
    }

    pub fn remove_peer(&self, participant_id: &ParticipantId) {
        self.inner.peers.remove(participant_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn send(&self, participant_id: ParticipantId, msg: SignalMessage) {
        if let Some(peer) = self.inner.peers.get(&participant_id) {
            if let Err(e) = peer.send(msg) {
                error!(
                    "Failed to queue {} for {}: connection task is gone",
                    e.0.kind(),
                    participant_id
                );
            }
        } else {
            warn!(
                "Attempted to send {} to disconnected participant {}",
                msg.kind(),
                participant_id
            );
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_signal(&self, participant_id: ParticipantId, msg: SignalMessage) {
        self.send(participant_id, msg);
    }
}
