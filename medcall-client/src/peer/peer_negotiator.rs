use crate::media::{LocalTracks, TrackKind};
use crate::negotiation::{
    Effect, Input, Negotiation, NegotiationRole, NegotiationState, ProtocolViolation,
};
use crate::peer::{
    NegotiatorEvent, NegotiatorEventKind, PeerConnection, PeerConnectionFactory,
    PeerConnectionState, PeerError, PeerEvent, PeerEventSink, SessionDescription,
};
use crate::session::SignalingTransport;
use medcall_core::{IceCandidate, IceServerConfig, ParticipantInfo, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// What the session needs to know after a negotiator step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiatorNotice {
    Negotiated,
    StateChanged(PeerConnectionState),
    RemoteTrack(TrackKind),
    Failed(String),
}

/// Shared collaborators for opening a [`PeerNegotiator`].
pub struct NegotiatorSetup<'a> {
    pub factory: &'a dyn PeerConnectionFactory,
    pub ice_servers: &'a [IceServerConfig],
    pub local: &'a LocalTracks,
    pub transport: Arc<dyn SignalingTransport>,
    pub events: mpsc::UnboundedSender<NegotiatorEvent>,
}

enum PeerOp {
    CreateOffer,
    AcceptOffer(String),
    ApplyAnswer(String),
    AddCandidate(IceCandidate),
}

/// Drives one peer connection through the offer/answer exchange with one
/// remote participant.
///
/// Operations on the connection run one at a time, in order, on a worker
/// task. Their results come back as [`NegotiatorEvent`]s carrying this
/// negotiator's generation, so results that outlive it can be recognised and
/// dropped.
pub struct PeerNegotiator {
    remote: ParticipantInfo,
    generation: u64,
    negotiation: Negotiation,
    connection: Arc<dyn PeerConnection>,
    transport: Arc<dyn SignalingTransport>,
    ops: mpsc::UnboundedSender<PeerOp>,
    worker: JoinHandle<()>,
    connection_state: PeerConnectionState,
}

impl PeerNegotiator {
    pub async fn open(
        remote: ParticipantInfo,
        role: NegotiationRole,
        generation: u64,
        setup: NegotiatorSetup<'_>,
    ) -> Result<Self, PeerError> {
        let sink = PeerEventSink::new(generation, setup.events.clone());
        let connection = setup
            .factory
            .create(setup.ice_servers, setup.local, sink)
            .await?;

        let (ops, ops_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(
            Arc::clone(&connection),
            ops_rx,
            generation,
            setup.events,
        ));

        info!(
            "Negotiating with {} {} as {}",
            remote.role, remote.participant_id, role
        );

        Ok(Self {
            remote,
            generation,
            negotiation: Negotiation::new(role),
            connection,
            transport: setup.transport,
            ops,
            worker,
            connection_state: PeerConnectionState::New,
        })
    }

    pub fn remote(&self) -> &ParticipantInfo {
        &self.remote
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn role(&self) -> NegotiationRole {
        self.negotiation.role()
    }

    pub fn state(&self) -> NegotiationState {
        self.negotiation.state()
    }

    pub fn connection_state(&self) -> PeerConnectionState {
        self.connection_state
    }

    pub fn start(&mut self) -> Vec<NegotiatorNotice> {
        self.handle(Input::Start)
    }

    pub fn handle(&mut self, input: Input) -> Vec<NegotiatorNotice> {
        let transition = self.negotiation.handle(input);

        match &transition.ignored {
            Some(v @ ProtocolViolation::Unexpected { .. }) => {
                warn!("Negotiation with {} ignored {}", self.remote.participant_id, v)
            }
            Some(v) => debug!("Negotiation with {} ignored {}", self.remote.participant_id, v),
            None => {}
        }

        self.apply(transition.effects)
    }

    pub fn handle_event(&mut self, kind: NegotiatorEventKind) -> Vec<NegotiatorNotice> {
        match kind {
            NegotiatorEventKind::Input(input) => self.handle(input),
            NegotiatorEventKind::Peer(event) => self.handle_peer_event(event),
        }
    }

    fn handle_peer_event(&mut self, event: PeerEvent) -> Vec<NegotiatorNotice> {
        match event {
            PeerEvent::LocalCandidate(candidate) => {
                if !self.negotiation.is_closed() {
                    self.signal(SignalMessage::IceCandidate {
                        candidate,
                        from: None,
                    });
                }
                Vec::new()
            }
            PeerEvent::StateChanged(state) => {
                info!(
                    "Peer connection with {} is {:?}",
                    self.remote.participant_id, state
                );
                self.connection_state = state;
                vec![NegotiatorNotice::StateChanged(state)]
            }
            PeerEvent::RemoteTrack(kind) => {
                debug!("Remote {} track from {}", kind, self.remote.participant_id);
                vec![NegotiatorNotice::RemoteTrack(kind)]
            }
        }
    }

    /// Closes the negotiation and the peer connection. Anything still in
    /// flight is dropped.
    pub async fn close(mut self) {
        let transition = self.negotiation.handle(Input::Close);
        self.apply(transition.effects);

        if let Err(e) = self.connection.close().await {
            warn!(
                "Error closing peer connection with {}: {}",
                self.remote.participant_id, e
            );
        }
        debug!("Negotiator for {} closed", self.remote.participant_id);
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Vec<NegotiatorNotice> {
        let mut notices = Vec::new();

        for effect in effects {
            match effect {
                Effect::CreateOffer => self.enqueue(PeerOp::CreateOffer),
                Effect::SendOffer { sdp, seq } => self.signal(SignalMessage::Offer {
                    sdp,
                    seq,
                    from: None,
                }),
                Effect::AcceptOffer { sdp } => self.enqueue(PeerOp::AcceptOffer(sdp)),
                Effect::SendAnswer { sdp, seq } => self.signal(SignalMessage::Answer {
                    sdp,
                    seq,
                    from: None,
                }),
                Effect::ApplyAnswer { sdp } => self.enqueue(PeerOp::ApplyAnswer(sdp)),
                Effect::AddCandidate(candidate) => self.enqueue(PeerOp::AddCandidate(candidate)),
                Effect::Negotiated => {
                    info!("Negotiation with {} is stable", self.remote.participant_id);
                    notices.push(NegotiatorNotice::Negotiated);
                }
                Effect::Failed { reason } => {
                    warn!(
                        "Negotiation with {} failed: {}",
                        self.remote.participant_id, reason
                    );
                    notices.push(NegotiatorNotice::Failed(reason));
                }
                Effect::Release => self.worker.abort(),
            }
        }

        notices
    }

    fn enqueue(&self, op: PeerOp) {
        if self.ops.send(op).is_err() {
            debug!("Worker for {} already stopped", self.remote.participant_id);
        }
    }

    fn signal(&self, msg: SignalMessage) {
        let kind = msg.kind();
        if let Err(e) = self.transport.send(msg) {
            warn!(
                "Could not send {} to {}: {}",
                kind, self.remote.participant_id, e
            );
        }
    }
}

impl Drop for PeerNegotiator {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_worker(
    connection: Arc<dyn PeerConnection>,
    mut ops: mpsc::UnboundedReceiver<PeerOp>,
    generation: u64,
    events: mpsc::UnboundedSender<NegotiatorEvent>,
) {
    let report = |input: Input| {
        let _ = events.send(NegotiatorEvent {
            generation,
            kind: NegotiatorEventKind::Input(input),
        });
    };
    let fail = |e: PeerError| {
        report(Input::OperationFailed {
            reason: e.to_string(),
        })
    };

    while let Some(op) = ops.recv().await {
        match op {
            PeerOp::CreateOffer => match connection.create_offer().await {
                Ok(sdp) => report(Input::LocalOfferReady { sdp }),
                Err(e) => {
                    fail(e);
                    break;
                }
            },
            PeerOp::AcceptOffer(sdp) => {
                if let Err(e) = connection
                    .set_remote_description(SessionDescription::offer(sdp))
                    .await
                {
                    fail(e);
                    break;
                }
                report(Input::RemoteDescriptionApplied);

                match connection.create_answer().await {
                    Ok(sdp) => report(Input::LocalAnswerReady { sdp }),
                    Err(e) => {
                        fail(e);
                        break;
                    }
                }
            }
            PeerOp::ApplyAnswer(sdp) => {
                match connection
                    .set_remote_description(SessionDescription::answer(sdp))
                    .await
                {
                    Ok(()) => report(Input::RemoteDescriptionApplied),
                    Err(e) => {
                        fail(e);
                        break;
                    }
                }
            }
            PeerOp::AddCandidate(candidate) => {
                if let Err(e) = connection.add_ice_candidate(candidate.clone()).await {
                    warn!("Rejected ICE candidate {}: {}", candidate.candidate, e);
                }
            }
        }
    }
}
