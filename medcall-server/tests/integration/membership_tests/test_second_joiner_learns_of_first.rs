use medcall_core::{ParticipantInfo, Role, SignalMessage};

use crate::integration::{connect, create_test_relay, init_tracing, join};

#[tokio::test]
async fn test_second_joiner_learns_of_first() {
    init_tracing();

    let (relay, output) = create_test_relay();
    let mut patient = connect(&relay, &output).await;
    let mut doctor = connect(&relay, &output).await;

    join(&relay, &mut patient, "appt-1", Role::Patient).await;
    output.clear().await;
    join(&relay, &mut doctor, "appt-1", Role::Doctor).await;

    let patient_info = ParticipantInfo {
        participant_id: patient.participant_id(),
        role: Role::Patient,
    };
    let doctor_info = ParticipantInfo {
        participant_id: doctor.participant_id(),
        role: Role::Doctor,
    };

    assert_eq!(
        output.take_for(&doctor.participant_id()).await,
        vec![SignalMessage::MeetingParticipants {
            participants: vec![patient_info]
        }]
    );
    assert_eq!(
        output.take_for(&patient.participant_id()).await,
        vec![SignalMessage::UserJoined {
            participant: doctor_info
        }]
    );
}
