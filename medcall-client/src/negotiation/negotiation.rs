use crate::negotiation::{NegotiationRole, NegotiationState, PendingIceQueue, ProtocolViolation};
use crate::peer::SdpKind;
use medcall_core::IceCandidate;
use std::collections::HashSet;

/// Everything that can move a negotiation forward. Remote messages come
/// from the relay, the rest are results of work the driver ran on the peer
/// connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    RemoteOffer { sdp: String, seq: u64 },
    RemoteAnswer { sdp: String, seq: u64 },
    RemoteCandidate(IceCandidate),
    LocalOfferReady { sdp: String },
    RemoteDescriptionApplied,
    LocalAnswerReady { sdp: String },
    OperationFailed { reason: String },
    Close,
}

impl Input {
    pub fn name(&self) -> &'static str {
        match self {
            Input::Start => "start",
            Input::RemoteOffer { .. } => "offer",
            Input::RemoteAnswer { .. } => "answer",
            Input::RemoteCandidate(_) => "ice-candidate",
            Input::LocalOfferReady { .. } => "local-offer",
            Input::RemoteDescriptionApplied => "remote-description-applied",
            Input::LocalAnswerReady { .. } => "local-answer",
            Input::OperationFailed { .. } => "operation-failed",
            Input::Close => "close",
        }
    }
}

/// Work the driver has to carry out after a transition, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CreateOffer,
    SendOffer { sdp: String, seq: u64 },
    /// Set the remote offer, then create an answer.
    AcceptOffer { sdp: String },
    SendAnswer { sdp: String, seq: u64 },
    ApplyAnswer { sdp: String },
    AddCandidate(IceCandidate),
    /// Both descriptions are in place.
    Negotiated,
    Failed { reason: String },
    Release,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transition {
    pub effects: Vec<Effect>,
    pub ignored: Option<ProtocolViolation>,
}

impl Transition {
    fn effects(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            ignored: None,
        }
    }

    fn none() -> Self {
        Self::default()
    }

    fn ignored(violation: ProtocolViolation) -> Self {
        Self {
            effects: Vec::new(),
            ignored: Some(violation),
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored.is_some()
    }
}

/// Offer/answer state machine for one remote participant.
///
/// Pure: `handle` never performs I/O, it only says what should happen next.
/// Results of work started by earlier effects are fed back in as inputs.
#[derive(Debug)]
pub struct Negotiation {
    role: NegotiationRole,
    state: NegotiationState,
    offer_sent: bool,
    remote_description_set: bool,
    announced: bool,
    pending_ice: PendingIceQueue,
    seen: HashSet<(SdpKind, u64)>,
    next_seq: u64,
}

impl Negotiation {
    pub fn new(role: NegotiationRole) -> Self {
        Self {
            role,
            state: NegotiationState::Idle,
            offer_sent: false,
            remote_description_set: false,
            announced: false,
            pending_ice: PendingIceQueue::new(),
            seen: HashSet::new(),
            next_seq: 0,
        }
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == NegotiationState::Closed
    }

    pub fn remote_description_set(&self) -> bool {
        self.remote_description_set
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_ice.len()
    }

    pub fn handle(&mut self, input: Input) -> Transition {
        if self.is_closed() {
            return Transition::ignored(ProtocolViolation::AfterClose {
                input: input.name(),
            });
        }

        let mut transition = match input {
            Input::Start => self.start(),
            Input::RemoteOffer { sdp, seq } => self.remote_offer(sdp, seq),
            Input::RemoteAnswer { sdp, seq } => self.remote_answer(sdp, seq),
            Input::RemoteCandidate(candidate) => self.remote_candidate(candidate),
            Input::LocalOfferReady { sdp } => self.local_offer_ready(sdp),
            Input::RemoteDescriptionApplied => self.remote_description_applied(),
            Input::LocalAnswerReady { sdp } => self.local_answer_ready(sdp),
            Input::OperationFailed { reason } => {
                self.shut();
                Transition::effects(vec![Effect::Failed { reason }, Effect::Release])
            }
            Input::Close => {
                self.shut();
                Transition::effects(vec![Effect::Release])
            }
        };

        if self.state == NegotiationState::Stable && self.remote_description_set && !self.announced
        {
            self.announced = true;
            transition.effects.push(Effect::Negotiated);
        }

        transition
    }

    fn start(&mut self) -> Transition {
        match (self.role, self.state) {
            (NegotiationRole::Initiator, NegotiationState::Idle) if !self.offer_sent => {
                self.state = NegotiationState::HaveLocalOffer;
                Transition::effects(vec![Effect::CreateOffer])
            }
            (NegotiationRole::Responder, NegotiationState::Idle) => Transition::none(),
            (_, state) => Transition::ignored(ProtocolViolation::UnexpectedStart { state }),
        }
    }

    fn remote_offer(&mut self, sdp: String, seq: u64) -> Transition {
        if self.seen.contains(&(SdpKind::Offer, seq)) {
            return Transition::ignored(ProtocolViolation::Duplicate {
                kind: SdpKind::Offer,
                seq,
            });
        }
        if self.state != NegotiationState::Idle {
            return Transition::ignored(ProtocolViolation::Unexpected {
                kind: SdpKind::Offer,
                state: self.state,
            });
        }

        self.seen.insert((SdpKind::Offer, seq));
        self.state = NegotiationState::HaveRemoteOffer;
        Transition::effects(vec![Effect::AcceptOffer { sdp }])
    }

    fn remote_answer(&mut self, sdp: String, seq: u64) -> Transition {
        if self.seen.contains(&(SdpKind::Answer, seq)) {
            return Transition::ignored(ProtocolViolation::Duplicate {
                kind: SdpKind::Answer,
                seq,
            });
        }
        if self.state != NegotiationState::HaveLocalOffer || !self.offer_sent {
            return Transition::ignored(ProtocolViolation::Unexpected {
                kind: SdpKind::Answer,
                state: self.state,
            });
        }

        self.seen.insert((SdpKind::Answer, seq));
        self.state = NegotiationState::Stable;
        Transition::effects(vec![Effect::ApplyAnswer { sdp }])
    }

    fn remote_candidate(&mut self, candidate: IceCandidate) -> Transition {
        if self.remote_description_set {
            Transition::effects(vec![Effect::AddCandidate(candidate)])
        } else {
            self.pending_ice.push(candidate);
            Transition::none()
        }
    }

    fn local_offer_ready(&mut self, sdp: String) -> Transition {
        if self.state != NegotiationState::HaveLocalOffer || self.offer_sent {
            return self.stale("local-offer");
        }

        self.offer_sent = true;
        let seq = self.bump_seq();
        Transition::effects(vec![Effect::SendOffer { sdp, seq }])
    }

    fn remote_description_applied(&mut self) -> Transition {
        let expected = matches!(
            self.state,
            NegotiationState::HaveRemoteOffer | NegotiationState::Stable
        );
        if !expected || self.remote_description_set {
            return self.stale("remote-description-applied");
        }

        self.remote_description_set = true;
        let effects = self
            .pending_ice
            .drain()
            .into_iter()
            .map(Effect::AddCandidate)
            .collect();
        Transition::effects(effects)
    }

    fn local_answer_ready(&mut self, sdp: String) -> Transition {
        if self.state != NegotiationState::HaveRemoteOffer {
            return self.stale("local-answer");
        }

        self.state = NegotiationState::Stable;
        let seq = self.bump_seq();
        Transition::effects(vec![Effect::SendAnswer { sdp, seq }])
    }

    fn stale(&self, input: &'static str) -> Transition {
        Transition::ignored(ProtocolViolation::StaleResult {
            input,
            state: self.state,
        })
    }

    fn shut(&mut self) {
        self.state = NegotiationState::Closed;
        self.pending_ice.clear();
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
