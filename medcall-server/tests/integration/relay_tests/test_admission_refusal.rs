use medcall_core::{ErrorCode, Role, RoomId, SignalMessage};
use medcall_server::ReplacementPolicy;
use std::sync::Arc;

use crate::integration::{connect, create_test_relay_with, init_tracing};
use crate::utils::TokenAdmission;

#[tokio::test]
async fn test_admission_refusal() {
    init_tracing();

    let (relay, output) = create_test_relay_with(
        ReplacementPolicy::ReplaceStale,
        Arc::new(TokenAdmission::new("valid")),
    );
    let mut patient = connect(&relay, &output).await;
    let room_id = RoomId::from("appt-1");

    for token in [None, Some("forged".to_owned())] {
        relay
            .handle(
                &mut patient,
                SignalMessage::JoinMeeting {
                    room_id: room_id.clone(),
                    role: Role::Patient,
                    token,
                },
            )
            .await;

        assert!(matches!(
            output.take_for(&patient.participant_id()).await.as_slice(),
            [SignalMessage::Error {
                code: ErrorCode::NotAdmitted,
                ..
            }]
        ));
    }
    assert_eq!(relay.registry().room_count(), 0);

    relay
        .handle(
            &mut patient,
            SignalMessage::JoinMeeting {
                room_id: room_id.clone(),
                role: Role::Patient,
                token: Some("valid".into()),
            },
        )
        .await;

    assert!(
        relay
            .registry()
            .contains(&room_id, &patient.participant_id())
    );
}
