mod participant;
mod room;
mod signaling;

pub use participant::{ParticipantId, ParticipantInfo, Role};
pub use room::RoomId;
pub use signaling::{ErrorCode, IceCandidate, IceServerConfig, SignalMessage};
