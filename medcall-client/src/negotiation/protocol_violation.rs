use crate::negotiation::NegotiationState;
use crate::peer::SdpKind;
use medcall_core::ParticipantId;
use thiserror::Error;

/// A signaling input the negotiation refused to act on.
///
/// These are logged and dropped. None of them is fatal to the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("duplicate {kind} #{seq}")]
    Duplicate { kind: SdpKind, seq: u64 },

    #[error("{kind} not expected in state {state}")]
    Unexpected { kind: SdpKind, state: NegotiationState },

    #[error("start not expected in state {state}")]
    UnexpectedStart { state: NegotiationState },

    #[error("stale {input} in state {state}")]
    StaleResult {
        input: &'static str,
        state: NegotiationState,
    },

    #[error("{input} after close")]
    AfterClose { input: &'static str },

    #[error("message from unknown participant {0}")]
    UnknownSender(ParticipantId),

    #[error("peer message without a sender")]
    MissingSender,
}
