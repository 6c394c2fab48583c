use thiserror::Error;

/// Why local capture could not be started.
///
/// Only [`MediaError::DeviceBusy`] is worth retrying. Every other variant
/// needs the user to do something first, so it is reported at once.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MediaError {
    #[error("camera or microphone access was denied")]
    PermissionDenied,

    #[error("no camera was found")]
    DeviceNotFound,

    #[error("camera or microphone is in use by another application")]
    DeviceBusy,

    #[error("media capture is not supported on this device")]
    Unsupported,
}

impl MediaError {
    pub fn is_retryable(self) -> bool {
        matches!(self, MediaError::DeviceBusy)
    }

    /// Maps a capture backend's error name (`NotAllowedError`,
    /// `NotReadableError`, ...) onto a [`MediaError`].
    pub fn from_dom_name(name: &str) -> Self {
        match name {
            "NotAllowedError" | "SecurityError" | "PermissionDeniedError" => {
                MediaError::PermissionDenied
            }
            "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError" => {
                MediaError::DeviceNotFound
            }
            "NotReadableError" | "TrackStartError" | "AbortError" => MediaError::DeviceBusy,
            _ => MediaError::Unsupported,
        }
    }
}
