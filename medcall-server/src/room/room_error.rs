use medcall_core::{Role, RoomId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room {room_id} already has two participants")]
    RoomFull { room_id: RoomId },

    #[error("a {role} is already connected to room {room_id}")]
    RoleTaken { room_id: RoomId, role: Role },
}
