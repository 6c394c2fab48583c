use crate::media::{MediaConfig, MediaDevices, Sleeper, TokioSleeper};
use crate::peer::PeerConnectionFactory;
use crate::session::SignalingTransport;
use medcall_core::IceServerConfig;
use medcall_core::utils::default_ice_servers;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Used until the relay sends its own list.
    pub ice_servers: Vec<IceServerConfig>,
    pub media: MediaConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ice_servers: default_ice_servers(),
            media: MediaConfig::default(),
        }
    }
}

/// Host-provided collaborators of a session.
#[derive(Clone)]
pub struct SessionDeps {
    pub media_devices: Arc<dyn MediaDevices>,
    pub sleeper: Arc<dyn Sleeper>,
    pub peer_factory: Arc<dyn PeerConnectionFactory>,
    pub transport: Arc<dyn SignalingTransport>,
}

impl SessionDeps {
    pub fn new(
        media_devices: Arc<dyn MediaDevices>,
        peer_factory: Arc<dyn PeerConnectionFactory>,
        transport: Arc<dyn SignalingTransport>,
    ) -> Self {
        Self {
            media_devices,
            sleeper: Arc::new(TokioSleeper),
            peer_factory,
            transport,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }
}
