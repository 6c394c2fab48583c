use async_trait::async_trait;
use medcall_core::{ParticipantId, SignalMessage};

/// Implemented by whatever owns the client connections (the WebSocket
/// service in production) so the relay can push messages out.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver a message to one connection. Delivery to a connection that is
    /// already gone is logged and dropped.
    async fn send_signal(&self, participant_id: ParticipantId, msg: SignalMessage);
}
