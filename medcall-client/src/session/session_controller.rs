use crate::media::{LocalTracks, MediaAcquirer, TrackKind};
use crate::negotiation::{Input, NegotiationRole, NegotiationState, ProtocolViolation};
use crate::peer::{
    NegotiatorEvent, NegotiatorNotice, NegotiatorSetup, PeerConnectionFactory,
    PeerConnectionState, PeerNegotiator,
};
use crate::session::{
    Appointment, ConnectionState, EndReason, SessionCommand, SessionConfig, SessionDeps,
    SessionError, SessionEvent, SessionHandle, SignalingTransport, TransportError,
};
use medcall_core::{ErrorCode, IceServerConfig, ParticipantId, ParticipantInfo, SignalMessage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Joining,
    InRoom,
    Ended,
}

/// One participant's side of a consultation.
///
/// Owns the local media, the room membership and one [`PeerNegotiator`] per
/// remote participant. All state changes happen on the task running
/// [`SessionController::run`] (or on whoever calls the methods directly), one
/// input at a time.
pub struct SessionController {
    appointment: Appointment,
    acquirer: MediaAcquirer,
    peer_factory: Arc<dyn PeerConnectionFactory>,
    transport: Arc<dyn SignalingTransport>,
    signals: mpsc::UnboundedReceiver<SignalMessage>,
    negotiator_tx: mpsc::UnboundedSender<NegotiatorEvent>,
    negotiator_rx: mpsc::UnboundedReceiver<NegotiatorEvent>,
    events: mpsc::UnboundedSender<SessionEvent>,

    phase: SessionPhase,
    end_reason: Option<EndReason>,
    self_id: Option<ParticipantId>,
    ice_servers: Vec<IceServerConfig>,
    local_tracks: Option<LocalTracks>,
    negotiators: HashMap<ParticipantId, PeerNegotiator>,
    remote_media: HashSet<ParticipantId>,
    next_generation: u64,
    connection_state: ConnectionState,
}

impl SessionController {
    /// `signals` carries everything the relay sends to this participant.
    pub fn new(
        appointment: Appointment,
        config: SessionConfig,
        deps: SessionDeps,
        signals: mpsc::UnboundedReceiver<SignalMessage>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (negotiator_tx, negotiator_rx) = mpsc::unbounded_channel();

        let controller = Self {
            appointment,
            acquirer: MediaAcquirer::new(deps.media_devices, deps.sleeper, config.media),
            peer_factory: deps.peer_factory,
            transport: deps.transport,
            signals,
            negotiator_tx,
            negotiator_rx,
            events,
            phase: SessionPhase::Idle,
            end_reason: None,
            self_id: None,
            ice_servers: config.ice_servers,
            local_tracks: None,
            negotiators: HashMap::new(),
            remote_media: HashSet::new(),
            next_generation: 0,
            connection_state: ConnectionState::Disconnected,
        };

        (controller, events_rx)
    }

    /// Runs the session on its own task.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<EndReason>) {
        let (handle, commands) = SessionHandle::channel();
        let task = tokio::spawn(self.run(commands));
        (handle, task)
    }

    pub fn appointment(&self) -> &Appointment {
        &self.appointment
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection_state
    }

    pub fn self_id(&self) -> Option<ParticipantId> {
        self.self_id
    }

    pub fn local_tracks(&self) -> Option<&LocalTracks> {
        self.local_tracks.as_ref()
    }

    pub fn negotiation_state(&self, participant_id: &ParticipantId) -> Option<NegotiationState> {
        self.negotiators.get(participant_id).map(PeerNegotiator::state)
    }

    pub fn negotiator_count(&self) -> usize {
        self.negotiators.len()
    }

    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<SessionCommand>) -> EndReason {
        if self.phase == SessionPhase::Idle {
            if let Err(e) = self.connect().await {
                error!(
                    "Could not start session for room {}: {}",
                    self.appointment.room_id, e
                );
                self.finish(EndReason::from(&e));
            }
        }

        loop {
            if let Some(reason) = &self.end_reason {
                return reason.clone();
            }

            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        debug!("Session handle dropped");
                        self.close().await;
                    }
                },
                signal = self.signals.recv() => match signal {
                    Some(msg) => self.handle_signal(msg).await,
                    None => {
                        warn!("Signaling connection to the relay was lost");
                        self.teardown(EndReason::TransportLost, false).await;
                    }
                },
                Some(event) = self.negotiator_rx.recv() => self.handle_negotiator_event(event).await,
            }
        }
    }

    pub async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::ToggleAudio => {
                self.toggle_audio();
            }
            SessionCommand::ToggleVideo => {
                self.toggle_video();
            }
            SessionCommand::SendChat(text) => {
                if let Err(e) = self.send_chat(text) {
                    warn!("Chat message not sent: {}", e);
                }
            }
            SessionCommand::Retry => {
                if let Err(e) = self.retry().await {
                    warn!("Retry failed: {}", e);
                }
            }
            SessionCommand::EndCall => self.end_call().await,
            SessionCommand::Close => self.close().await,
        }
    }

    /// Acquires local media and asks the relay to join the room.
    pub async fn connect(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::AlreadyStarted);
        }
        if !self.appointment.can_join {
            warn!(
                "Appointment {} cannot be joined yet",
                self.appointment.room_id
            );
            return Err(SessionError::NotPermitted(self.appointment.room_id.clone()));
        }

        self.set_connection_state(ConnectionState::Connecting);

        let tracks = match self.acquirer.acquire().await {
            Ok(tracks) => tracks,
            Err(e) => {
                self.set_connection_state(ConnectionState::Disconnected);
                return Err(e.into());
            }
        };

        if let Err(e) = self.send_join() {
            tracks.stop_all();
            self.set_connection_state(ConnectionState::Disconnected);
            return Err(e.into());
        }

        self.local_tracks = Some(tracks);
        self.phase = SessionPhase::Joining;
        Ok(())
    }

    /// Drops every negotiator and joins the room afresh. Local media is
    /// kept.
    pub async fn retry(&mut self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::Ended => Err(SessionError::Ended),
            SessionPhase::Idle => self.connect().await,
            SessionPhase::Joining | SessionPhase::InRoom => {
                info!("Rejoining room {}", self.appointment.room_id);
                self.close_negotiators().await;

                let rejoin = self
                    .transport
                    .send(SignalMessage::LeaveMeeting)
                    .and_then(|()| self.send_join());
                if let Err(e) = rejoin {
                    self.teardown(EndReason::TransportLost, false).await;
                    return Err(e.into());
                }

                self.phase = SessionPhase::Joining;
                self.set_connection_state(ConnectionState::Connecting);
                Ok(())
            }
        }
    }

    pub fn toggle_audio(&mut self) -> Option<bool> {
        self.toggle(TrackKind::Audio)
    }

    pub fn toggle_video(&mut self) -> Option<bool> {
        self.toggle(TrackKind::Video)
    }

    pub fn send_chat(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Ended {
            return Err(SessionError::Ended);
        }

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        self.transport.send(SignalMessage::ChatMessage {
            text: text.into(),
            sender_role: self.appointment.role,
            timestamp,
            from: None,
        })?;
        Ok(())
    }

    /// Ends the call for both participants.
    pub async fn end_call(&mut self) {
        if self.phase == SessionPhase::Ended {
            debug!("end call on an ended session");
            return;
        }

        if matches!(self.phase, SessionPhase::Joining | SessionPhase::InRoom) {
            let end = SignalMessage::EndCall {
                room_id: self.appointment.room_id.clone(),
            };
            if let Err(e) = self.transport.send(end) {
                warn!("Could not tell the relay the call ended: {}", e);
            }
        }

        self.teardown(EndReason::EndedLocally, false).await;
    }

    /// Leaves the room without ending it for the other participant.
    pub async fn close(&mut self) {
        self.teardown(EndReason::Closed, true).await;
    }

    pub async fn handle_signal(&mut self, msg: SignalMessage) {
        if self.phase == SessionPhase::Ended {
            debug!("Ignoring {} after the session ended", msg.kind());
            return;
        }

        debug!("Received {}", msg.kind());

        match msg {
            SignalMessage::Welcome { participant_id } => {
                info!("Relay assigned handle {}", participant_id);
                self.self_id = Some(participant_id);
            }
            SignalMessage::IceConfig { ice_servers } => {
                info!("Received ICE config: {} server(s)", ice_servers.len());
                if !ice_servers.is_empty() {
                    self.ice_servers = ice_servers;
                }
            }
            SignalMessage::MeetingParticipants { participants } => {
                self.phase = SessionPhase::InRoom;
                info!(
                    "Joined room {} with {} other participant(s)",
                    self.appointment.room_id,
                    participants.len()
                );
                for participant in participants {
                    self.ensure_negotiator(participant, NegotiationRole::Initiator)
                        .await;
                }
            }
            SignalMessage::UserJoined { participant } => {
                info!(
                    "{} {} joined the room",
                    participant.role, participant.participant_id
                );
                self.ensure_negotiator(participant, NegotiationRole::Responder)
                    .await;
            }
            SignalMessage::UserLeft { participant } => self.remote_left(participant).await,
            SignalMessage::Offer { sdp, seq, from } => {
                self.deliver(from, Input::RemoteOffer { sdp, seq }).await
            }
            SignalMessage::Answer { sdp, seq, from } => {
                self.deliver(from, Input::RemoteAnswer { sdp, seq }).await
            }
            SignalMessage::IceCandidate { candidate, from } => {
                self.deliver(from, Input::RemoteCandidate(candidate)).await
            }
            SignalMessage::ChatMessage {
                text,
                sender_role,
                timestamp,
                ..
            } => self.emit(SessionEvent::ChatReceived {
                text,
                sender_role,
                timestamp,
            }),
            SignalMessage::EndCall { room_id } => {
                info!("Call in room {} was ended by the other participant", room_id);
                self.teardown(EndReason::EndedByRemote, true).await;
            }
            SignalMessage::SessionReplaced => {
                warn!("Another connection took over this seat");
                self.teardown(EndReason::Replaced, false).await;
            }
            SignalMessage::Error { code, message } => {
                warn!("Relay reported {:?}: {}", code, message);
                let refused = matches!(code, ErrorCode::RoomFull | ErrorCode::NotAdmitted);
                if refused && self.phase == SessionPhase::Joining {
                    self.teardown(EndReason::Rejected { code, message }, false)
                        .await;
                }
            }
            other @ (SignalMessage::JoinMeeting { .. } | SignalMessage::LeaveMeeting) => {
                warn!("Unexpected {} from the relay", other.kind());
            }
        }
    }

    pub async fn handle_negotiator_event(&mut self, event: NegotiatorEvent) {
        let owner = self
            .negotiators
            .iter()
            .find(|(_, n)| n.generation() == event.generation)
            .map(|(id, _)| *id);

        let Some(participant_id) = owner else {
            debug!("Discarding result for closed negotiator #{}", event.generation);
            return;
        };

        let notices = match self.negotiators.get_mut(&participant_id) {
            Some(negotiator) => negotiator.handle_event(event.kind),
            None => return,
        };
        self.process_notices(participant_id, notices).await;
    }

    /// The only place negotiators are created. At most one exists per remote
    /// participant.
    async fn ensure_negotiator(&mut self, remote: ParticipantInfo, role: NegotiationRole) {
        let remote_id = remote.participant_id;
        if Some(remote_id) == self.self_id {
            return;
        }
        if self.negotiators.contains_key(&remote_id) {
            debug!("Already negotiating with {}", remote_id);
            return;
        }
        let Some(local) = self.local_tracks.as_ref() else {
            warn!("No local media, not negotiating with {}", remote_id);
            return;
        };

        self.next_generation += 1;
        let generation = self.next_generation;
        let setup = NegotiatorSetup {
            factory: self.peer_factory.as_ref(),
            ice_servers: &self.ice_servers,
            local,
            transport: Arc::clone(&self.transport),
            events: self.negotiator_tx.clone(),
        };

        match PeerNegotiator::open(remote, role, generation, setup).await {
            Ok(mut negotiator) => {
                let notices = negotiator.start();
                self.negotiators.insert(remote_id, negotiator);
                self.process_notices(remote_id, notices).await;
            }
            Err(e) => {
                error!("Could not open peer connection to {}: {}", remote_id, e);
                self.emit(SessionEvent::NegotiationFailed {
                    participant: remote_id,
                    reason: e.to_string(),
                });
                self.set_connection_state(ConnectionState::Failed);
            }
        }
    }

    async fn deliver(&mut self, from: Option<ParticipantId>, input: Input) {
        let Some(from) = from else {
            warn!("Dropping {}: {}", input.name(), ProtocolViolation::MissingSender);
            return;
        };
        let Some(negotiator) = self.negotiators.get_mut(&from) else {
            warn!(
                "Dropping {}: {}",
                input.name(),
                ProtocolViolation::UnknownSender(from)
            );
            return;
        };

        let notices = negotiator.handle(input);
        self.process_notices(from, notices).await;
    }

    async fn process_notices(&mut self, participant_id: ParticipantId, notices: Vec<NegotiatorNotice>) {
        for notice in notices {
            match notice {
                NegotiatorNotice::Negotiated | NegotiatorNotice::RemoteTrack(_) => {
                    self.set_connection_state(ConnectionState::Connected);
                    self.mark_remote_media(participant_id);
                }
                NegotiatorNotice::StateChanged(PeerConnectionState::Connected) => {
                    self.set_connection_state(ConnectionState::Connected);
                }
                NegotiatorNotice::StateChanged(PeerConnectionState::Disconnected) => {
                    self.set_connection_state(ConnectionState::Disconnected);
                }
                NegotiatorNotice::StateChanged(PeerConnectionState::Failed) => {
                    self.fail_negotiation(participant_id, "ICE connection failed".to_owned())
                        .await;
                    return;
                }
                NegotiatorNotice::StateChanged(_) => {}
                NegotiatorNotice::Failed(reason) => {
                    self.fail_negotiation(participant_id, reason).await;
                    return;
                }
            }
        }
    }

    async fn fail_negotiation(&mut self, participant_id: ParticipantId, reason: String) {
        if let Some(negotiator) = self.negotiators.remove(&participant_id) {
            let remote = *negotiator.remote();
            negotiator.close().await;
            self.clear_remote_media(remote);
        }

        self.emit(SessionEvent::NegotiationFailed {
            participant: participant_id,
            reason,
        });
        self.set_connection_state(ConnectionState::Failed);
    }

    async fn remote_left(&mut self, participant: ParticipantInfo) {
        info!(
            "{} {} left the room",
            participant.role, participant.participant_id
        );

        if let Some(negotiator) = self.negotiators.remove(&participant.participant_id) {
            negotiator.close().await;
        }
        self.clear_remote_media(participant);

        if self.negotiators.is_empty() {
            self.set_connection_state(ConnectionState::Connecting);
        }
    }

    async fn close_negotiators(&mut self) {
        let negotiators: Vec<PeerNegotiator> =
            self.negotiators.drain().map(|(_, n)| n).collect();
        for negotiator in negotiators {
            let remote = *negotiator.remote();
            negotiator.close().await;
            if self.remote_media.contains(&remote.participant_id) {
                self.clear_remote_media(remote);
            }
        }
    }

    /// Releases everything this session holds and moves it to its terminal
    /// state. Safe to call more than once.
    async fn teardown(&mut self, reason: EndReason, send_leave: bool) {
        if self.phase == SessionPhase::Ended {
            return;
        }

        self.close_negotiators().await;

        if let Some(tracks) = self.local_tracks.take() {
            tracks.stop_all();
            debug!("Local media released");
        }

        let joined = matches!(self.phase, SessionPhase::Joining | SessionPhase::InRoom);
        if send_leave && joined {
            if let Err(e) = self.transport.send(SignalMessage::LeaveMeeting) {
                debug!("Leave not delivered: {}", e);
            }
        }

        info!(
            "Session in room {} ended: {:?}",
            self.appointment.room_id, reason
        );
        self.set_connection_state(ConnectionState::Disconnected);
        self.finish(reason);
    }

    fn finish(&mut self, reason: EndReason) {
        self.phase = SessionPhase::Ended;
        self.end_reason = Some(reason.clone());
        self.emit(SessionEvent::Ended { reason });
    }

    fn send_join(&self) -> Result<(), TransportError> {
        info!(
            "Joining room {} as {}",
            self.appointment.room_id, self.appointment.role
        );
        self.transport.send(SignalMessage::JoinMeeting {
            room_id: self.appointment.room_id.clone(),
            role: self.appointment.role,
            token: self.appointment.token.clone(),
        })
    }

    fn toggle(&mut self, kind: TrackKind) -> Option<bool> {
        let tracks = self.local_tracks.as_ref()?;
        let enabled = !tracks.kind_enabled(kind);
        if !tracks.set_kind_enabled(kind, enabled) {
            return None;
        }

        info!("Local {} {}", kind, if enabled { "on" } else { "muted" });
        self.emit(SessionEvent::LocalMediaToggled { kind, enabled });
        Some(enabled)
    }

    fn mark_remote_media(&mut self, participant_id: ParticipantId) {
        let Some(negotiator) = self.negotiators.get(&participant_id) else {
            return;
        };
        let participant = *negotiator.remote();

        if self.remote_media.insert(participant_id) {
            self.emit(SessionEvent::RemoteMediaAvailable {
                participant,
                available: true,
            });
        }
    }

    fn clear_remote_media(&mut self, participant: ParticipantInfo) {
        self.remote_media.remove(&participant.participant_id);
        self.emit(SessionEvent::RemoteMediaAvailable {
            participant,
            available: false,
        });
    }

    fn set_connection_state(&mut self, state: ConnectionState) {
        if self.connection_state == state {
            return;
        }
        debug!("Connection state {} -> {}", self.connection_state, state);
        self.connection_state = state;
        self.emit(SessionEvent::ConnectionStateChanged(state));
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("No listener for session events");
        }
    }
}
