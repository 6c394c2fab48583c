use crate::negotiation::Input;
use crate::peer::PeerEvent;

/// Message from a negotiator's background work back to the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatorEvent {
    pub generation: u64,
    pub kind: NegotiatorEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NegotiatorEventKind {
    /// Outcome of an operation on the peer connection.
    Input(Input),
    Peer(PeerEvent),
}
