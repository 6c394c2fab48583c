use crate::room::{Participant, RoomRegistry};
use crate::signaling::{Admission, ConnectionSession, SignalingOutput};
use medcall_core::{
    ErrorCode, IceServerConfig, ParticipantId, ParticipantInfo, Role, RoomId, SignalMessage,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes messages between the members of a room.
///
/// The relay never looks inside SDP or ICE payloads. Apart from membership
/// bookkeeping it only stamps the sender handle on peer messages.
#[derive(Clone)]
pub struct SignalingRelay {
    registry: RoomRegistry,
    output: Arc<dyn SignalingOutput>,
    admission: Arc<dyn Admission>,
    ice_servers: Vec<IceServerConfig>,
}

impl SignalingRelay {
    pub fn new(
        registry: RoomRegistry,
        output: Arc<dyn SignalingOutput>,
        admission: Arc<dyn Admission>,
        ice_servers: Vec<IceServerConfig>,
    ) -> Self {
        Self {
            registry,
            output,
            admission,
            ice_servers,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Greets a freshly accepted connection with its handle and the ICE
    /// servers to use.
    pub async fn connect(&self, participant_id: ParticipantId) -> ConnectionSession {
        info!("Participant {} connected", participant_id);

        self.output
            .send_signal(participant_id, SignalMessage::Welcome { participant_id })
            .await;
        self.output
            .send_signal(
                participant_id,
                SignalMessage::IceConfig {
                    ice_servers: self.ice_servers.clone(),
                },
            )
            .await;

        ConnectionSession::new(participant_id)
    }

    pub async fn handle(&self, session: &mut ConnectionSession, msg: SignalMessage) {
        debug!("{} from {}", msg.kind(), session.participant_id());

        match msg {
            SignalMessage::JoinMeeting {
                room_id,
                role,
                token,
            } => self.join(session, room_id, role, token).await,
            SignalMessage::LeaveMeeting => self.leave(session).await,
            SignalMessage::EndCall { room_id } => self.end_call(session, room_id).await,
            msg if msg.is_peer_message() => self.relay(session, msg).await,
            other => {
                warn!(
                    "Participant {} sent server-only message {}",
                    session.participant_id(),
                    other.kind()
                );
                self.send_error(
                    session.participant_id(),
                    ErrorCode::InvalidMessage,
                    format!("{} cannot be sent by a client", other.kind()),
                )
                .await;
            }
        }
    }

    /// Transport-level disconnect. Same as an explicit leave.
    pub async fn disconnect(&self, session: &mut ConnectionSession) {
        self.leave(session).await;
        info!("Participant {} disconnected", session.participant_id());
    }

    async fn join(
        &self,
        session: &mut ConnectionSession,
        room_id: RoomId,
        role: Role,
        token: Option<String>,
    ) {
        let participant_id = session.participant_id();

        let switching = session
            .joined()
            .is_some_and(|current| current.room_id != room_id || current.role != role);
        if switching {
            self.leave(session).await;
        }

        if let Err(e) = self.admission.admit(&room_id, role, token.as_deref()).await {
            warn!("Join of {} to {} refused: {}", participant_id, room_id, e);
            self.send_error(participant_id, ErrorCode::NotAdmitted, e.to_string())
                .await;
            return;
        }

        let participant = Participant {
            id: participant_id,
            role,
            room_id: room_id.clone(),
        };

        let outcome = match self.registry.join(participant.clone()) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Join of {} rejected: {}", participant_id, e);
                self.send_error(participant_id, ErrorCode::RoomFull, e.to_string())
                    .await;
                return;
            }
        };

        info!(
            "Participant {} joined room {} as {} ({} other member(s))",
            participant_id,
            room_id,
            role,
            outcome.others.len()
        );
        session.joined = Some(participant.clone());

        if let Some(stale) = &outcome.evicted {
            info!("Replacing stale handle {} in room {}", stale.id, room_id);
            self.output
                .send_signal(stale.id, SignalMessage::SessionReplaced)
                .await;
            self.broadcast(
                &outcome.others,
                SignalMessage::UserLeft {
                    participant: stale.info(),
                },
            )
            .await;
        }

        let participants: Vec<ParticipantInfo> =
            outcome.others.iter().map(Participant::info).collect();
        self.output
            .send_signal(
                participant_id,
                SignalMessage::MeetingParticipants { participants },
            )
            .await;

        if !outcome.rejoined {
            self.broadcast(
                &outcome.others,
                SignalMessage::UserJoined {
                    participant: participant.info(),
                },
            )
            .await;
        }
    }

    async fn leave(&self, session: &mut ConnectionSession) {
        let Some(participant) = session.joined.take() else {
            return;
        };

        let Some(outcome) = self.registry.leave(&participant.room_id, &participant.id) else {
            debug!(
                "Participant {} already out of room {}",
                participant.id, participant.room_id
            );
            return;
        };

        info!(
            "Participant {} left room {}",
            participant.id, participant.room_id
        );
        self.broadcast(
            &outcome.remaining,
            SignalMessage::UserLeft {
                participant: outcome.left.info(),
            },
        )
        .await;
    }

    async fn end_call(&self, session: &mut ConnectionSession, room_id: RoomId) {
        let participant_id = session.participant_id();

        let Some(participant) = session.joined() else {
            debug!("end-call from {} outside any room", participant_id);
            return;
        };

        if participant.room_id != room_id {
            warn!(
                "Participant {} tried to end room {} while in {}",
                participant_id, room_id, participant.room_id
            );
            self.send_error(
                participant_id,
                ErrorCode::NotInRoom,
                format!("not a member of room {room_id}"),
            )
            .await;
            return;
        }

        session.joined = None;

        if !self.registry.contains(&room_id, &participant_id) {
            debug!("Room {} already ended", room_id);
            return;
        }

        let members = self.registry.end(&room_id);
        info!("Participant {} ended the call in room {}", participant_id, room_id);

        let others: Vec<Participant> = members
            .into_iter()
            .filter(|m| m.id != participant_id)
            .collect();
        self.broadcast(&others, SignalMessage::EndCall { room_id }).await;
    }

    async fn relay(&self, session: &mut ConnectionSession, msg: SignalMessage) {
        let participant_id = session.participant_id();

        let Some(participant) = session.joined() else {
            warn!("{} from {} outside any room", msg.kind(), participant_id);
            self.send_error(
                participant_id,
                ErrorCode::NotInRoom,
                "join a meeting before signaling".to_owned(),
            )
            .await;
            return;
        };

        let room_id = participant.room_id.clone();
        if !self.registry.contains(&room_id, &participant_id) {
            warn!(
                "Dropping {} from {}: no longer a member of {}",
                msg.kind(),
                participant_id,
                room_id
            );
            session.joined = None;
            self.send_error(
                participant_id,
                ErrorCode::NotInRoom,
                format!("no longer a member of room {room_id}"),
            )
            .await;
            return;
        }

        let msg = msg.with_sender(participant_id);
        let others = self.registry.others(&room_id, &participant_id);
        if others.is_empty() {
            debug!("{} from {} has no recipient yet", msg.kind(), participant_id);
        }
        self.broadcast(&others, msg).await;
    }

    async fn broadcast(&self, recipients: &[Participant], msg: SignalMessage) {
        for recipient in recipients {
            self.output.send_signal(recipient.id, msg.clone()).await;
        }
    }

    async fn send_error(&self, participant_id: ParticipantId, code: ErrorCode, message: String) {
        self.output
            .send_signal(participant_id, SignalMessage::Error { code, message })
            .await;
    }
}
