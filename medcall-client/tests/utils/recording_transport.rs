use medcall_client::{SignalingTransport, TransportError};
use medcall_core::SignalMessage;
use std::sync::{Arc, Mutex};

/// Transport that keeps everything sent through it.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<SignalMessage>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.kind() == kind)
            .count()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl SignalingTransport for RecordingTransport {
    fn send(&self, msg: SignalMessage) -> Result<(), TransportError> {
        tracing::debug!("[RecordingTransport] {}", msg.kind());
        self.sent.lock().unwrap().push(msg);
        Ok(())
    }
}
