use medcall_core::{ParticipantInfo, Role, RoomId, SignalMessage};

use crate::integration::{connect, create_test_relay, init_tracing, join};

#[tokio::test]
async fn test_stale_handle_is_replaced() {
    init_tracing();

    let (relay, output) = create_test_relay();
    let mut patient = connect(&relay, &output).await;
    let mut stale_doctor = connect(&relay, &output).await;
    let mut fresh_doctor = connect(&relay, &output).await;

    join(&relay, &mut patient, "appt-1", Role::Patient).await;
    join(&relay, &mut stale_doctor, "appt-1", Role::Doctor).await;
    output.clear().await;

    join(&relay, &mut fresh_doctor, "appt-1", Role::Doctor).await;

    assert_eq!(
        output.take_for(&stale_doctor.participant_id()).await,
        vec![SignalMessage::SessionReplaced]
    );

    // The remaining member learns about the departure before the arrival.
    assert_eq!(
        output.take_for(&patient.participant_id()).await,
        vec![
            SignalMessage::UserLeft {
                participant: ParticipantInfo {
                    participant_id: stale_doctor.participant_id(),
                    role: Role::Doctor,
                }
            },
            SignalMessage::UserJoined {
                participant: ParticipantInfo {
                    participant_id: fresh_doctor.participant_id(),
                    role: Role::Doctor,
                }
            },
        ]
    );

    let members = relay.registry().members(&RoomId::from("appt-1"));
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|m| m.id != stale_doctor.participant_id()));

    // Anything the stale handle still sends is refused, not relayed.
    relay
        .handle(
            &mut stale_doctor,
            SignalMessage::Offer {
                sdp: "v=0".into(),
                seq: 1,
                from: None,
            },
        )
        .await;
    assert!(output.take_for(&patient.participant_id()).await.is_empty());
    assert!(matches!(
        output.take_for(&stale_doctor.participant_id()).await.as_slice(),
        [SignalMessage::Error { .. }]
    ));
}
