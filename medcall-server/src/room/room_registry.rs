use crate::room::{JoinOutcome, LeaveOutcome, Participant, ReplacementPolicy, Room, RoomError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use medcall_core::{ParticipantId, RoomId};
use std::sync::Arc;
use tracing::{debug, info};

/// Meeting id -> connected participants.
///
/// Each room lives behind its own map entry, so membership updates for one
/// room are serialized while different rooms never contend with each other.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, Room>>,
    policy: ReplacementPolicy,
}

impl RoomRegistry {
    pub fn new(policy: ReplacementPolicy) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Adds `participant` to the room named by `participant.room_id`,
    /// creating the room on first join.
    pub fn join(&self, participant: Participant) -> Result<JoinOutcome, RoomError> {
        let room_id = participant.room_id.clone();

        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                let outcome = entry.get_mut().admit(participant, self.policy)?;
                debug!(
                    "Room {} now has {} member(s)",
                    room_id,
                    entry.get().len()
                );
                Ok(outcome)
            }
            Entry::Vacant(entry) => {
                info!("Creating new room: {}", room_id);
                let mut room = Room::new(room_id);
                let outcome = room.admit(participant, self.policy)?;
                entry.insert(room);
                Ok(outcome)
            }
        }
    }

    /// Removes a participant. The room is destroyed when it becomes empty.
    /// Returns `None` when the room or the participant is already gone.
    pub fn leave(&self, room_id: &RoomId, participant_id: &ParticipantId) -> Option<LeaveOutcome> {
        let Entry::Occupied(mut entry) = self.rooms.entry(room_id.clone()) else {
            return None;
        };

        let left = entry.get_mut().remove(participant_id)?;
        let remaining = entry.get().members().to_vec();

        if remaining.is_empty() {
            entry.remove();
            info!("Room {} is empty, destroying", room_id);
        }

        Some(LeaveOutcome { left, remaining })
    }

    /// Forcibly destroys a room, returning everyone who was in it.
    pub fn end(&self, room_id: &RoomId) -> Vec<Participant> {
        match self.rooms.remove(room_id) {
            Some((_, room)) => {
                info!("Room {} ended", room_id);
                room.into_members()
            }
            None => Vec::new(),
        }
    }

    pub fn members(&self, room_id: &RoomId) -> Vec<Participant> {
        self.rooms
            .get(room_id)
            .map(|room| room.members().to_vec())
            .unwrap_or_default()
    }

    pub fn others(&self, room_id: &RoomId, participant_id: &ParticipantId) -> Vec<Participant> {
        self.rooms
            .get(room_id)
            .map(|room| room.others(participant_id))
            .unwrap_or_default()
    }

    pub fn contains(&self, room_id: &RoomId, participant_id: &ParticipantId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|room| room.contains(participant_id))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(ReplacementPolicy::ReplaceStale)
    }
}
