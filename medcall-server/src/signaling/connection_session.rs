use crate::room::Participant;
use medcall_core::ParticipantId;

/// Per-connection state owned by the connection task.
#[derive(Debug)]
pub struct ConnectionSession {
    participant_id: ParticipantId,
    pub(crate) joined: Option<Participant>,
}

impl ConnectionSession {
    pub(crate) fn new(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            joined: None,
        }
    }

    pub fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }

    /// Room membership as last recorded for this connection. The registry is
    /// authoritative: the room may have been ended or this handle replaced.
    pub fn joined(&self) -> Option<&Participant> {
        self.joined.as_ref()
    }
}
