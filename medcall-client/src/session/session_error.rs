use crate::media::MediaError;
use crate::session::TransportError;
use medcall_core::RoomId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("joining room {0} is not permitted yet")]
    NotPermitted(RoomId),

    #[error("session already started")]
    AlreadyStarted,

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("session has ended")]
    Ended,
}
