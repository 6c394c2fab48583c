//! Integration tests for medcall-client.
//!
//! Tests are organized by functionality:
//! - `negotiator_tests` - one negotiator against a fake peer connection
//! - `session_tests` - a session driven by scripted relay messages
//! - `call_tests` - two sessions talking through an in-process relay


use medcall_client::{
    Appointment, ChannelTransport, EndReason, NegotiatorEvent, NegotiatorNotice, PeerNegotiator,
    SessionConfig, SessionController, SessionDeps, SessionEvent, SessionHandle,
};
use medcall_core::{ParticipantId, ParticipantInfo, Role, SignalMessage};
use medcall_server::{AppState, LocalConnection};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::Level;

use crate::utils::{FakeMediaDevices, FakePeerFactory, RecordingTransport};

pub const ROOM: &str = "appt-1042";
const WAIT: Duration = Duration::from_secs(2);

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn participant(role: Role) -> ParticipantInfo {
    ParticipantInfo {
        participant_id: ParticipantId::new(),
        role,
    }
}

/// Session whose relay is the test itself: signals are pushed by hand and
/// everything the session sends is recorded.
pub struct ScriptedSession {
    pub controller: SessionController,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub signals: mpsc::UnboundedSender<SignalMessage>,
    pub transport: RecordingTransport,
    pub media: Arc<FakeMediaDevices>,
    pub peers: Arc<FakePeerFactory>,
}

pub fn scripted_session(appointment: Appointment, peers: Arc<FakePeerFactory>) -> ScriptedSession {
    scripted_session_with(appointment, peers, FakeMediaDevices::new())
}

pub fn scripted_session_with(
    appointment: Appointment,
    peers: Arc<FakePeerFactory>,
    media: Arc<FakeMediaDevices>,
) -> ScriptedSession {
    let transport = RecordingTransport::new();
    let (signals, signals_rx) = mpsc::unbounded_channel();
    let deps = SessionDeps::new(media.clone(), peers.clone(), Arc::new(transport.clone()));
    let (controller, events) =
        SessionController::new(appointment, SessionConfig::default(), deps, signals_rx);

    ScriptedSession {
        controller,
        events,
        signals,
        transport,
        media,
        peers,
    }
}

/// Session connected to an in-process relay and running on its own task.
pub struct LiveSession {
    pub participant_id: ParticipantId,
    pub handle: SessionHandle,
    pub task: JoinHandle<EndReason>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub media: Arc<FakeMediaDevices>,
    pub peers: Arc<FakePeerFactory>,
}

pub async fn live_session(state: &AppState, role: Role) -> LiveSession {
    let (participant_id, outbound, inbound) = LocalConnection::open(state).await.into_parts();
    let media = FakeMediaDevices::new();
    let peers = FakePeerFactory::new();
    let deps = SessionDeps::new(
        media.clone(),
        peers.clone(),
        Arc::new(ChannelTransport::new(outbound)),
    );
    let (controller, events) = SessionController::new(
        Appointment::new(ROOM, role),
        SessionConfig::default(),
        deps,
        inbound,
    );
    let (handle, task) = controller.spawn();

    LiveSession {
        participant_id,
        handle,
        task,
        events,
        media,
        peers,
    }
}

/// Waits for the first event matching `pred`, skipping the others.
pub async fn wait_for_event(
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    pred: impl Fn(&SessionEvent) -> bool,
) -> SessionEvent {
    timeout(WAIT, async {
        loop {
            match events.recv().await {
                Some(event) if pred(&event) => return event,
                Some(_) => continue,
                None => panic!("Session event stream closed"),
            }
        }
    })
    .await
    .expect("Timed out waiting for session event")
}

/// All events currently queued, without waiting.
pub fn drain_events(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

/// Polls `cond` until it holds.
pub async fn eventually(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + WAIT;
    while !cond() {
        if Instant::now() > deadline {
            panic!("Timed out waiting for {what}");
        }
        sleep(Duration::from_millis(10)).await;
    }
}

/// Feeds worker results back into the negotiator until it goes quiet.
pub async fn settle(
    negotiator: &mut PeerNegotiator,
    events: &mut mpsc::UnboundedReceiver<NegotiatorEvent>,
) -> Vec<NegotiatorNotice> {
    let mut notices = Vec::new();
    while let Ok(Some(event)) = timeout(Duration::from_millis(200), events.recv()).await {
        assert_eq!(event.generation, negotiator.generation());
        notices.extend(negotiator.handle_event(event.kind));
    }
    notices
}
