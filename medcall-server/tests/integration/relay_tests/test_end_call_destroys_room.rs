use medcall_core::{Role, RoomId, SignalMessage};

use crate::integration::{connect, create_test_relay, init_tracing, join};

#[tokio::test]
async fn test_end_call_destroys_room() {
    init_tracing();

    let (relay, output) = create_test_relay();
    let mut patient = connect(&relay, &output).await;
    let mut doctor = connect(&relay, &output).await;
    join(&relay, &mut patient, "appt-1", Role::Patient).await;
    join(&relay, &mut doctor, "appt-1", Role::Doctor).await;
    output.clear().await;

    let room_id = RoomId::from("appt-1");
    relay
        .handle(
            &mut doctor,
            SignalMessage::EndCall {
                room_id: room_id.clone(),
            },
        )
        .await;

    assert_eq!(
        output.take_for(&patient.participant_id()).await,
        vec![SignalMessage::EndCall {
            room_id: room_id.clone()
        }]
    );
    assert_eq!(relay.registry().room_count(), 0);
    assert!(doctor.joined().is_none());

    // The other side's follow-up leave and a repeated end-call are no-ops.
    relay.handle(&mut patient, SignalMessage::LeaveMeeting).await;
    relay
        .handle(&mut patient, SignalMessage::EndCall { room_id })
        .await;
    assert!(output.take_for(&doctor.participant_id()).await.is_empty());
    assert!(output.take_for(&patient.participant_id()).await.is_empty());
}
