use medcall_client::{
    Appointment, EndReason, NegotiationState, SessionEvent, SessionPhase,
};
use medcall_core::{ParticipantId, Role, RoomId, SignalMessage};

use crate::integration::{ROOM, drain_events, init_tracing, participant, scripted_session};
use crate::utils::FakePeerFactory;

#[tokio::test]
async fn test_end_call_during_local_offer() {
    init_tracing();

    let mut s = scripted_session(
        Appointment::new(ROOM, Role::Doctor),
        FakePeerFactory::holding_offers(),
    );
    s.controller.connect().await.unwrap();
    assert!(matches!(
        &s.transport.sent()[0],
        SignalMessage::JoinMeeting { role: Role::Doctor, .. }
    ));

    let patient = participant(Role::Patient);
    s.controller
        .handle_signal(SignalMessage::Welcome {
            participant_id: ParticipantId::new(),
        })
        .await;
    s.controller
        .handle_signal(SignalMessage::MeetingParticipants {
            participants: vec![patient],
        })
        .await;
    assert_eq!(
        s.controller.negotiation_state(&patient.participant_id),
        Some(NegotiationState::HaveLocalOffer)
    );

    s.controller.end_call().await;

    assert!(s.media.all_stopped());
    assert!(s.peers.last().unwrap().is_closed());
    assert_eq!(s.controller.phase(), SessionPhase::Ended);
    assert_eq!(s.controller.negotiator_count(), 0);
    assert!(s.controller.local_tracks().is_none());
    assert_eq!(
        s.transport.sent().last(),
        Some(&SignalMessage::EndCall {
            room_id: RoomId::from(ROOM)
        })
    );
    assert_eq!(s.transport.count("offer"), 0);
    assert_eq!(
        drain_events(&mut s.events).last(),
        Some(&SessionEvent::Ended {
            reason: EndReason::EndedLocally
        })
    );

    // The relay's own end-call arriving afterwards changes nothing.
    let sent = s.transport.sent().len();
    s.controller
        .handle_signal(SignalMessage::EndCall {
            room_id: RoomId::from(ROOM),
        })
        .await;
    s.controller.end_call().await;

    assert!(drain_events(&mut s.events).is_empty());
    assert_eq!(s.transport.sent().len(), sent);
}
