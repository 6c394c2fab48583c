use crate::media::MediaConstraintTier;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => f.write_str("audio"),
            TrackKind::Video => f.write_str("video"),
        }
    }
}

/// A live capture track owned by the host's media stack.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;
    fn kind(&self) -> TrackKind;
    /// Muting keeps the track alive and the capture device open.
    ///
    /// Only the flag changes here. Whatever feeds frames to the peer
    /// connection must check [`MediaTrack::is_enabled`] before writing each
    /// sample, or a muted track keeps sending.
    fn set_enabled(&self, enabled: bool);
    fn is_enabled(&self) -> bool;
    /// Stops capture for good and releases the device.
    fn stop(&self);
    fn is_live(&self) -> bool;
}

/// Flag-only [`MediaTrack`] for backends that push frames elsewhere and only
/// need the enabled and live state tracked here.
#[derive(Debug)]
pub struct CapturedTrack {
    id: String,
    kind: TrackKind,
    enabled: AtomicBool,
    live: AtomicBool,
}

impl CapturedTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            enabled: AtomicBool::new(true),
            live: AtomicBool::new(true),
        }
    }
}

impl MediaTrack for CapturedTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// The local audio and video tracks of one call.
#[derive(Clone, Default)]
pub struct LocalTracks {
    tracks: Vec<Arc<dyn MediaTrack>>,
    tier: Option<MediaConstraintTier>,
}

impl fmt::Debug for LocalTracks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTracks")
            .field(
                "tracks",
                &self
                    .tracks
                    .iter()
                    .map(|t| (t.kind(), t.id().to_owned()))
                    .collect::<Vec<_>>(),
            )
            .field("tier", &self.tier)
            .finish()
    }
}

impl LocalTracks {
    pub fn new(tracks: Vec<Arc<dyn MediaTrack>>) -> Self {
        Self { tracks, tier: None }
    }

    pub fn with_tier(mut self, tier: MediaConstraintTier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Quality tier the tracks were captured at, when known.
    pub fn tier(&self) -> Option<MediaConstraintTier> {
        self.tier
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn of_kind(&self, kind: TrackKind) -> impl Iterator<Item = &Arc<dyn MediaTrack>> {
        self.tracks.iter().filter(move |t| t.kind() == kind)
    }

    /// True when at least one track of `kind` exists and all of them are
    /// enabled.
    pub fn kind_enabled(&self, kind: TrackKind) -> bool {
        let mut tracks = self.of_kind(kind).peekable();
        tracks.peek().is_some() && tracks.all(|t| t.is_enabled())
    }

    /// Enables or mutes every track of `kind`. Returns false when there is
    /// no such track.
    pub fn set_kind_enabled(&self, kind: TrackKind, enabled: bool) -> bool {
        let mut touched = false;
        for track in self.of_kind(kind) {
            track.set_enabled(enabled);
            touched = true;
        }
        touched
    }

    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}
