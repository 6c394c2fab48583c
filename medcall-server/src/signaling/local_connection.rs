use crate::AppState;
use medcall_core::{ParticipantId, SignalMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// In-process connection to the relay.
///
/// Runs the same per-connection loop as the WebSocket handler but over tokio
/// channels, for hosts that embed the relay next to their clients.
/// Dropping `outbound` (or the whole value) is a transport disconnect.
pub struct LocalConnection {
    pub participant_id: ParticipantId,
    /// Client -> server.
    pub outbound: mpsc::UnboundedSender<SignalMessage>,
    /// Server -> client.
    pub inbound: mpsc::UnboundedReceiver<SignalMessage>,
    task: JoinHandle<()>,
}

impl LocalConnection {
    pub async fn open(state: &AppState) -> Self {
        let participant_id = ParticipantId::new();
        let (to_client_tx, to_client_rx) = mpsc::unbounded_channel();
        let (to_server_tx, mut to_server_rx) = mpsc::unbounded_channel::<SignalMessage>();

        state.service.add_peer(participant_id, to_client_tx);
        let mut session = state.relay.connect(participant_id).await;

        let task = tokio::spawn({
            let state = state.clone();
            async move {
                while let Some(msg) = to_server_rx.recv().await {
                    state.relay.handle(&mut session, msg).await;
                }
                state.relay.disconnect(&mut session).await;
                state.service.remove_peer(&participant_id);
                info!("Local connection {} closed", participant_id);
            }
        });

        Self {
            participant_id,
            outbound: to_server_tx,
            inbound: to_client_rx,
            task,
        }
    }

    /// Splits into the raw channel halves. The connection task keeps running
    /// until every clone of the outbound sender is dropped.
    pub fn into_parts(
        self,
    ) -> (
        ParticipantId,
        mpsc::UnboundedSender<SignalMessage>,
        mpsc::UnboundedReceiver<SignalMessage>,
    ) {
        (self.participant_id, self.outbound, self.inbound)
    }

    /// Closes the client side and waits for the server to process the
    /// disconnect.
    pub async fn close(self) {
        drop(self.outbound);
        let _ = self.task.await;
    }
}
