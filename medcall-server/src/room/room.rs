use crate::room::room_error::RoomError;
use medcall_core::{ParticipantId, ParticipantInfo, Role, RoomId};

/// Two-party calling: patient and doctor.
pub const ROOM_CAPACITY: usize = 2;

/// A live connection that joined a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub role: Role,
    pub room_id: RoomId,
}

impl Participant {
    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo {
            participant_id: self.id,
            role: self.role,
        }
    }
}

/// What happens when a role that is already present joins again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// The old handle is treated as stale and evicted.
    ReplaceStale,
    /// The join is rejected.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Members other than the joiner, in join order.
    pub others: Vec<Participant>,
    /// Stale handle that was replaced by this join.
    pub evicted: Option<Participant>,
    /// The joiner was already a member; nothing changed.
    pub rejoined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    pub left: Participant,
    pub remaining: Vec<Participant>,
}

/// Membership of one meeting, ordered by arrival.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    members: Vec<Participant>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: Vec::with_capacity(ROOM_CAPACITY),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, participant_id: &ParticipantId) -> bool {
        self.members.iter().any(|m| &m.id == participant_id)
    }

    pub fn others(&self, participant_id: &ParticipantId) -> Vec<Participant> {
        self.members
            .iter()
            .filter(|m| &m.id != participant_id)
            .cloned()
            .collect()
    }

    pub fn admit(
        &mut self,
        participant: Participant,
        policy: ReplacementPolicy,
    ) -> Result<JoinOutcome, RoomError> {
        if self.contains(&participant.id) {
            return Ok(JoinOutcome {
                others: self.others(&participant.id),
                evicted: None,
                rejoined: true,
            });
        }

        let same_role = self.members.iter().position(|m| m.role == participant.role);

        let evicted = match (same_role, policy) {
            (Some(idx), ReplacementPolicy::ReplaceStale) => Some(self.members.remove(idx)),
            (Some(_), ReplacementPolicy::Reject) => {
                return Err(RoomError::RoleTaken {
                    room_id: self.id.clone(),
                    role: participant.role,
                });
            }
            // Two members cover both roles today, so this needs a room that
            // holds two members of one role or a role added later.
            (None, _) if self.members.len() >= ROOM_CAPACITY => {
                return Err(RoomError::RoomFull {
                    room_id: self.id.clone(),
                });
            }
            (None, _) => None,
        };

        let others = self.members.clone();
        self.members.push(participant);

        Ok(JoinOutcome {
            others,
            evicted,
            rejoined: false,
        })
    }

    pub fn remove(&mut self, participant_id: &ParticipantId) -> Option<Participant> {
        let idx = self.members.iter().position(|m| &m.id == participant_id)?;
        Some(self.members.remove(idx))
    }

    pub fn into_members(self) -> Vec<Participant> {
        self.members
    }
}
