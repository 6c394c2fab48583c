use crate::model::participant::{ParticipantId, ParticipantInfo, Role};
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// A trickle-ICE candidate as produced by `RTCPeerConnection.onicecandidate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    RoomFull,
    NotAdmitted,
    NotInRoom,
    InvalidMessage,
}

/// Everything exchanged over the room-scoped message bus.
///
/// Peer-to-peer variants carry a `from` field which the relay always stamps
/// with the sending connection's handle, overwriting whatever the client put
/// there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum SignalMessage {
    // client -> server
    JoinMeeting {
        room_id: RoomId,
        role: Role,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    LeaveMeeting,
    EndCall {
        room_id: RoomId,
    },

    // peer -> peer, via the relay
    Offer {
        sdp: String,
        seq: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ParticipantId>,
    },
    Answer {
        sdp: String,
        seq: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ParticipantId>,
    },
    IceCandidate {
        candidate: IceCandidate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ParticipantId>,
    },
    ChatMessage {
        text: String,
        sender_role: Role,
        timestamp: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<ParticipantId>,
    },

    // server -> client
    Welcome {
        participant_id: ParticipantId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    MeetingParticipants {
        participants: Vec<ParticipantInfo>,
    },
    UserJoined {
        participant: ParticipantInfo,
    },
    UserLeft {
        participant: ParticipantInfo,
    },
    SessionReplaced,
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl SignalMessage {
    /// Wire name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::JoinMeeting { .. } => "join-meeting",
            SignalMessage::LeaveMeeting => "leave-meeting",
            SignalMessage::EndCall { .. } => "end-call",
            SignalMessage::Offer { .. } => "offer",
            SignalMessage::Answer { .. } => "answer",
            SignalMessage::IceCandidate { .. } => "ice-candidate",
            SignalMessage::ChatMessage { .. } => "chat-message",
            SignalMessage::Welcome { .. } => "welcome",
            SignalMessage::IceConfig { .. } => "ice-config",
            SignalMessage::MeetingParticipants { .. } => "meeting-participants",
            SignalMessage::UserJoined { .. } => "user-joined",
            SignalMessage::UserLeft { .. } => "user-left",
            SignalMessage::SessionReplaced => "session-replaced",
            SignalMessage::Error { .. } => "error",
        }
    }

    /// True for the variants the relay forwards verbatim to the other member.
    pub fn is_peer_message(&self) -> bool {
        matches!(
            self,
            SignalMessage::Offer { .. }
                | SignalMessage::Answer { .. }
                | SignalMessage::IceCandidate { .. }
                | SignalMessage::ChatMessage { .. }
        )
    }

    /// Sender handle stamped by the relay, if this is a peer message.
    pub fn sender(&self) -> Option<ParticipantId> {
        match self {
            SignalMessage::Offer { from, .. }
            | SignalMessage::Answer { from, .. }
            | SignalMessage::IceCandidate { from, .. }
            | SignalMessage::ChatMessage { from, .. } => *from,
            _ => None,
        }
    }

    /// Overwrites the sender of a peer message. Other variants are returned
    /// untouched.
    pub fn with_sender(mut self, sender: ParticipantId) -> Self {
        match &mut self {
            SignalMessage::Offer { from, .. }
            | SignalMessage::Answer { from, .. }
            | SignalMessage::IceCandidate { from, .. }
            | SignalMessage::ChatMessage { from, .. } => *from = Some(sender),
            _ => {}
        }
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
