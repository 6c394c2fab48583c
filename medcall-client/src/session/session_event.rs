use crate::media::{MediaError, TrackKind};
use crate::session::{ConnectionState, SessionError};
use medcall_core::{ErrorCode, ParticipantId, ParticipantInfo, Role};

/// Why a session reached its terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    EndedLocally,
    EndedByRemote,
    Closed,
    TransportLost,
    /// Another connection took over this participant's seat.
    Replaced,
    Rejected { code: ErrorCode, message: String },
    NotPermitted,
    MediaUnavailable(MediaError),
}

impl From<&SessionError> for EndReason {
    fn from(e: &SessionError) -> Self {
        match e {
            SessionError::NotPermitted(_) => EndReason::NotPermitted,
            SessionError::Media(media) => EndReason::MediaUnavailable(*media),
            SessionError::Transport(_) => EndReason::TransportLost,
            SessionError::AlreadyStarted | SessionError::Ended => EndReason::Closed,
        }
    }
}

/// Outward notifications for the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ConnectionStateChanged(ConnectionState),
    RemoteMediaAvailable {
        participant: ParticipantInfo,
        available: bool,
    },
    LocalMediaToggled {
        kind: TrackKind,
        enabled: bool,
    },
    ChatReceived {
        text: String,
        sender_role: Role,
        timestamp: u64,
    },
    /// Recoverable. The UI offers a retry, nothing is retried automatically.
    NegotiationFailed {
        participant: ParticipantId,
        reason: String,
    },
    Ended {
        reason: EndReason,
    },
}
