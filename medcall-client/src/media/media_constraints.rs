use std::fmt;
use std::time::Duration;

/// One rung of the video quality ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraintTier {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl MediaConstraintTier {
    pub const FULL: Self = Self::new(1280, 720, 30);
    pub const REDUCED: Self = Self::new(640, 480, 24);
    pub const MINIMAL: Self = Self::new(320, 240, 15);

    pub const fn new(width: u32, height: u32, frame_rate: u32) -> Self {
        Self {
            width,
            height,
            frame_rate,
        }
    }
}

impl fmt::Display for MediaConstraintTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@{}", self.width, self.height, self.frame_rate)
    }
}

pub const DEFAULT_TIERS: [MediaConstraintTier; 3] = [
    MediaConstraintTier::FULL,
    MediaConstraintTier::REDUCED,
    MediaConstraintTier::MINIMAL,
];

/// What is asked of the capture backend in a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub video: MediaConstraintTier,
    pub audio: bool,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
}

impl MediaConstraints {
    pub fn for_tier(video: MediaConstraintTier) -> Self {
        Self {
            video,
            audio: true,
            echo_cancellation: true,
            noise_suppression: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    /// Tried in order. The last tier is reused if attempts outnumber tiers.
    pub tiers: Vec<MediaConstraintTier>,
    /// Wait between attempts after the device reported itself busy.
    pub backoff: Duration,
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub audio: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_TIERS.to_vec(),
            backoff: Duration::from_secs(2),
            max_attempts: 3,
            audio: true,
        }
    }
}

impl MediaConfig {
    pub fn tier_for_attempt(&self, attempt: usize) -> MediaConstraintTier {
        self.tiers
            .get(attempt)
            .or(self.tiers.last())
            .copied()
            .unwrap_or(MediaConstraintTier::MINIMAL)
    }

    pub fn constraints_for_attempt(&self, attempt: usize) -> MediaConstraints {
        MediaConstraints {
            audio: self.audio,
            ..MediaConstraints::for_tier(self.tier_for_attempt(attempt))
        }
    }
}
