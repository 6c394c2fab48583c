use medcall_core::{ErrorCode, Role, RoomId, SignalMessage};
use medcall_server::{OpenAdmission, ReplacementPolicy};
use std::sync::Arc;

use crate::integration::{connect, create_test_relay_with, init_tracing, join};

#[tokio::test]
async fn test_third_join_rejected() {
    init_tracing();

    let (relay, output) =
        create_test_relay_with(ReplacementPolicy::Reject, Arc::new(OpenAdmission));
    let mut patient = connect(&relay, &output).await;
    let mut doctor = connect(&relay, &output).await;
    let mut intruder = connect(&relay, &output).await;

    join(&relay, &mut patient, "appt-1", Role::Patient).await;
    join(&relay, &mut doctor, "appt-1", Role::Doctor).await;
    output.clear().await;

    join(&relay, &mut intruder, "appt-1", Role::Doctor).await;

    assert!(matches!(
        output.take_for(&intruder.participant_id()).await.as_slice(),
        [SignalMessage::Error {
            code: ErrorCode::RoomFull,
            ..
        }]
    ));
    assert!(output.take_for(&patient.participant_id()).await.is_empty());
    assert!(intruder.joined().is_none());
    assert_eq!(relay.registry().members(&RoomId::from("appt-1")).len(), 2);
}
