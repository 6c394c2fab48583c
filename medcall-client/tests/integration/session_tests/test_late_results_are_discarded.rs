use medcall_client::{
    Appointment, ConnectionState, Input, NegotiationState, NegotiatorEvent,
    NegotiatorEventKind, SessionEvent, SessionPhase,
};
use medcall_core::{Role, SignalMessage};

use crate::integration::{ROOM, drain_events, init_tracing, participant, scripted_session};
use crate::utils::FakePeerFactory;

#[tokio::test]
async fn test_late_results_are_discarded() {
    init_tracing();

    let mut s = scripted_session(
        Appointment::new(ROOM, Role::Doctor),
        FakePeerFactory::holding_offers(),
    );
    s.controller.connect().await.unwrap();

    let patient = participant(Role::Patient);
    s.controller
        .handle_signal(SignalMessage::MeetingParticipants {
            participants: vec![patient],
        })
        .await;
    let pc = s.peers.last().unwrap();
    let stale_generation = pc.generation();

    s.controller
        .handle_signal(SignalMessage::UserLeft {
            participant: patient,
        })
        .await;

    assert!(pc.is_closed());
    assert_eq!(s.controller.negotiator_count(), 0);
    assert_eq!(s.controller.phase(), SessionPhase::InRoom);
    assert_eq!(s.controller.connection_state(), ConnectionState::Connecting);
    assert!(drain_events(&mut s.events).contains(&SessionEvent::RemoteMediaAvailable {
        participant: patient,
        available: false,
    }));

    // The patient comes back; a fresh negotiator takes over.
    s.controller
        .handle_signal(SignalMessage::UserJoined {
            participant: patient,
        })
        .await;
    assert_eq!(
        s.controller.negotiation_state(&patient.participant_id),
        Some(NegotiationState::Idle)
    );

    // The offer the first negotiator was working on finally shows up.
    s.controller
        .handle_negotiator_event(NegotiatorEvent {
            generation: stale_generation,
            kind: NegotiatorEventKind::Input(Input::LocalOfferReady {
                sdp: "v=0 late offer".to_owned(),
            }),
        })
        .await;

    assert_eq!(s.transport.count("offer"), 0);
    assert_eq!(
        s.controller.negotiation_state(&patient.participant_id),
        Some(NegotiationState::Idle)
    );
}
