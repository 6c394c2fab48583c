use async_trait::async_trait;
use medcall_core::{Role, RoomId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("a token is required to join room {0}")]
    MissingToken(RoomId),

    #[error("not admitted: {0}")]
    Denied(String),
}

/// Gate evaluated before a `join-meeting` is accepted.
///
/// Token validation and the `canJoin` decision belong to the host
/// application; the relay only asks.
#[async_trait]
pub trait Admission: Send + Sync {
    async fn admit(
        &self,
        room_id: &RoomId,
        role: Role,
        token: Option<&str>,
    ) -> Result<(), AdmissionError>;
}

/// Accepts every join.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAdmission;

#[async_trait]
impl Admission for OpenAdmission {
    async fn admit(&self, _: &RoomId, _: Role, _: Option<&str>) -> Result<(), AdmissionError> {
        Ok(())
    }
}
