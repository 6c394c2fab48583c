use medcall_core::{Role, RoomId};

/// The slice of an appointment record the call needs.
///
/// `can_join` is computed upstream from payment, cancellation and readiness.
/// `token` is handed to the relay's admission check untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub room_id: RoomId,
    pub role: Role,
    pub can_join: bool,
    pub token: Option<String>,
}

impl Appointment {
    pub fn new(room_id: impl Into<RoomId>, role: Role) -> Self {
        Self {
            room_id: room_id.into(),
            role,
            can_join: true,
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
