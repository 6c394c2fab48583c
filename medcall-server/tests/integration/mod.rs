//! Integration tests for medcall-server.
//!
//! Tests are organized by functionality:
//! - `membership_tests` - join/leave bookkeeping and notifications
//! - `relay_tests` - message routing and end-call teardown
//! - `connection_tests` - in-process connections and the HTTP surface

pub mod membership_tests;

use medcall_core::{ParticipantId, Role, RoomId, SignalMessage};
use medcall_server::{
    Admission, ConnectionSession, OpenAdmission, ReplacementPolicy, RoomRegistry, SignalingRelay,
};
use std::sync::Arc;
use tracing::Level;

use crate::utils::MockSignalingOutput;

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Create a relay whose output is captured by a mock.
pub fn create_test_relay() -> (SignalingRelay, MockSignalingOutput) {
    create_test_relay_with(ReplacementPolicy::ReplaceStale, Arc::new(OpenAdmission))
}

pub fn create_test_relay_with(
    policy: ReplacementPolicy,
    admission: Arc<dyn Admission>,
) -> (SignalingRelay, MockSignalingOutput) {
    let output = MockSignalingOutput::new();
    let relay = SignalingRelay::new(
        RoomRegistry::new(policy),
        Arc::new(output.clone()),
        admission,
        Vec::new(),
    );
    (relay, output)
}

/// Connect a new participant and discard the greeting messages.
pub async fn connect(relay: &SignalingRelay, output: &MockSignalingOutput) -> ConnectionSession {
    let session = relay.connect(ParticipantId::new()).await;
    output.take_for(&session.participant_id()).await;
    session
}

pub async fn join(relay: &SignalingRelay, session: &mut ConnectionSession, room: &str, role: Role) {
    relay
        .handle(
            session,
            SignalMessage::JoinMeeting {
                room_id: RoomId::from(room),
                role,
                token: None,
            },
        )
        .await;
}
