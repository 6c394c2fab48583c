use medcall_client::{ConnectionState, EndReason, SessionEvent};
use medcall_core::{Role, RoomId};
use medcall_server::{AppState, OpenAdmission, ServerConfig};
use std::sync::Arc;

use crate::integration::{ROOM, eventually, init_tracing, live_session, wait_for_event};

#[tokio::test]
async fn test_remote_end_call() {
    init_tracing();

    let state = AppState::new(&ServerConfig::default(), Arc::new(OpenAdmission));
    let room_id = RoomId::from(ROOM);

    let mut patient = live_session(&state, Role::Patient).await;
    eventually("patient to join", || {
        state.relay.registry().members(&room_id).len() == 1
    })
    .await;
    let mut doctor = live_session(&state, Role::Doctor).await;

    for events in [&mut patient.events, &mut doctor.events] {
        wait_for_event(events, |e| {
            *e == SessionEvent::ConnectionStateChanged(ConnectionState::Connected)
        })
        .await;
    }

    doctor.handle.end_call().unwrap();

    assert_eq!(doctor.task.await.unwrap(), EndReason::EndedLocally);
    assert_eq!(patient.task.await.unwrap(), EndReason::EndedByRemote);

    assert!(doctor.media.all_stopped());
    assert!(patient.media.all_stopped());
    assert!(doctor.peers.last().unwrap().is_closed());
    assert!(patient.peers.last().unwrap().is_closed());
    assert_eq!(state.relay.registry().room_count(), 0);

    // The handles outlive the sessions but can no longer drive them.
    assert!(patient.handle.toggle_audio().is_err());
}
