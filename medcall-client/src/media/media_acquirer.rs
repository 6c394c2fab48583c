use crate::media::{DeviceKind, LocalTracks, MediaConfig, MediaDevices, MediaError, Sleeper};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Starts local capture, stepping down the quality ladder while the camera
/// reports itself busy.
#[derive(Clone)]
pub struct MediaAcquirer {
    devices: Arc<dyn MediaDevices>,
    sleeper: Arc<dyn Sleeper>,
    config: MediaConfig,
}

impl MediaAcquirer {
    pub fn new(devices: Arc<dyn MediaDevices>, sleeper: Arc<dyn Sleeper>, config: MediaConfig) -> Self {
        Self {
            devices,
            sleeper,
            config,
        }
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub async fn acquire(&self) -> Result<LocalTracks, MediaError> {
        let devices = self.devices.enumerate_devices().await?;
        if !devices.iter().any(|d| d.kind == DeviceKind::VideoInput) {
            warn!("No video input among {} device(s)", devices.len());
            return Err(MediaError::DeviceNotFound);
        }

        let attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let constraints = self.config.constraints_for_attempt(attempt);
            debug!(
                "Requesting media at {} (attempt {}/{})",
                constraints.video,
                attempt + 1,
                attempts
            );

            match self.devices.get_user_media(&constraints).await {
                Ok(tracks) => {
                    info!("Local media acquired at {}", constraints.video);
                    return Ok(tracks.with_tier(constraints.video));
                }
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    warn!(
                        "Camera busy at {}, retrying in {:?}",
                        constraints.video, self.config.backoff
                    );
                    self.sleeper.sleep(self.config.backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!("Media acquisition failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}
