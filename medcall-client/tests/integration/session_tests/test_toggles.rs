use medcall_client::{Appointment, MediaTrack, SessionEvent, TrackKind};
use medcall_core::Role;

use crate::integration::{ROOM, drain_events, init_tracing, scripted_session};
use crate::utils::FakePeerFactory;

#[tokio::test]
async fn test_toggles_mute_without_releasing() {
    init_tracing();

    let mut s = scripted_session(Appointment::new(ROOM, Role::Patient), FakePeerFactory::new());

    // Nothing to toggle before media is acquired.
    assert_eq!(s.controller.toggle_audio(), None);

    s.controller.connect().await.unwrap();
    drain_events(&mut s.events);

    assert_eq!(s.controller.toggle_audio(), Some(false));
    assert_eq!(s.controller.toggle_video(), Some(false));
    assert_eq!(s.controller.toggle_audio(), Some(true));

    for track in s.media.issued() {
        assert!(track.is_live());
        assert_eq!(track.is_enabled(), track.kind() == TrackKind::Audio);
    }

    assert_eq!(
        drain_events(&mut s.events),
        vec![
            SessionEvent::LocalMediaToggled {
                kind: TrackKind::Audio,
                enabled: false
            },
            SessionEvent::LocalMediaToggled {
                kind: TrackKind::Video,
                enabled: false
            },
            SessionEvent::LocalMediaToggled {
                kind: TrackKind::Audio,
                enabled: true
            },
        ]
    );
}
