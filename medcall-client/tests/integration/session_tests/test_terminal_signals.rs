use medcall_client::{Appointment, EndReason};
use medcall_core::{ErrorCode, Role, SignalMessage};

use crate::integration::{ROOM, init_tracing, scripted_session};
use crate::utils::FakePeerFactory;

#[tokio::test]
async fn test_session_replaced() {
    init_tracing();

    let s = scripted_session(Appointment::new(ROOM, Role::Patient), FakePeerFactory::new());
    let (_handle, task) = s.controller.spawn();

    s.signals
        .send(SignalMessage::MeetingParticipants {
            participants: vec![],
        })
        .unwrap();
    s.signals.send(SignalMessage::SessionReplaced).unwrap();

    assert_eq!(task.await.unwrap(), EndReason::Replaced);
    assert!(s.media.all_stopped());
    assert_eq!(s.transport.count("leave-meeting"), 0);
}

#[tokio::test]
async fn test_relay_disconnect_tears_down() {
    init_tracing();

    let s = scripted_session(Appointment::new(ROOM, Role::Doctor), FakePeerFactory::new());
    let (_handle, task) = s.controller.spawn();

    s.signals
        .send(SignalMessage::MeetingParticipants {
            participants: vec![],
        })
        .unwrap();
    drop(s.signals);

    assert_eq!(task.await.unwrap(), EndReason::TransportLost);
    assert!(s.media.all_stopped());
}

#[tokio::test]
async fn test_refused_join_ends_session() {
    init_tracing();

    let s = scripted_session(Appointment::new(ROOM, Role::Doctor), FakePeerFactory::new());
    let (_handle, task) = s.controller.spawn();

    s.signals
        .send(SignalMessage::Error {
            code: ErrorCode::NotAdmitted,
            message: "bad token".to_owned(),
        })
        .unwrap();

    assert_eq!(
        task.await.unwrap(),
        EndReason::Rejected {
            code: ErrorCode::NotAdmitted,
            message: "bad token".to_owned(),
        }
    );
    assert!(s.media.all_stopped());
}
