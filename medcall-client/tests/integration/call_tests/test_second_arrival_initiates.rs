use medcall_client::{ConnectionState, SessionEvent};
use medcall_core::{Role, RoomId};
use medcall_server::{AppState, OpenAdmission, ServerConfig};
use std::sync::Arc;

use crate::integration::{ROOM, eventually, init_tracing, live_session, wait_for_event};
use crate::utils::PeerCall;

#[tokio::test]
async fn test_second_arrival_initiates() {
    init_tracing();

    let state = AppState::new(&ServerConfig::default(), Arc::new(OpenAdmission));
    let room_id = RoomId::from(ROOM);

    let mut patient = live_session(&state, Role::Patient).await;
    eventually("patient to join", || {
        state.relay.registry().members(&room_id).len() == 1
    })
    .await;
    // Alone in the room: nobody to negotiate with.
    assert!(patient.peers.connections().is_empty());

    let mut doctor = live_session(&state, Role::Doctor).await;

    for events in [&mut patient.events, &mut doctor.events] {
        wait_for_event(events, |e| {
            *e == SessionEvent::ConnectionStateChanged(ConnectionState::Connected)
        })
        .await;
    }

    assert_eq!(doctor.peers.offers_created(), 1);
    assert_eq!(patient.peers.offers_created(), 0);
    assert_eq!(
        patient.peers.last().unwrap().calls()[0],
        PeerCall::SetRemote(medcall_client::SdpKind::Offer)
    );

    let remote = wait_for_event(&mut patient.events, |e| {
        matches!(e, SessionEvent::RemoteMediaAvailable { .. })
    })
    .await;
    assert!(matches!(
        remote,
        SessionEvent::RemoteMediaAvailable { participant, available: true }
            if participant.participant_id == doctor.participant_id
    ));

    doctor.handle.send_chat("Can you hear me?").unwrap();
    let chat = wait_for_event(&mut patient.events, |e| {
        matches!(e, SessionEvent::ChatReceived { .. })
    })
    .await;
    assert!(matches!(
        chat,
        SessionEvent::ChatReceived { text, sender_role: Role::Doctor, .. }
            if text == "Can you hear me?"
    ));

    patient.handle.close().unwrap();
    doctor.handle.close().unwrap();
    patient.task.await.unwrap();
    doctor.task.await.unwrap();
}
