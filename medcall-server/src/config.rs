use crate::room::ReplacementPolicy;
use clap::{ArgAction, Parser};
use medcall_core::IceServerConfig;
use medcall_core::utils::default_ice_servers;
use std::net::SocketAddr;

#[derive(Parser, Debug, Clone)]
#[command(name = "medcall-server", about = "Signaling relay for two-party video consultations")]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "MEDCALL_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// STUN/TURN URLs handed to clients. Public STUN servers when empty.
    #[arg(long = "ice-url", env = "MEDCALL_ICE_URLS", value_delimiter = ',')]
    pub ice_urls: Vec<String>,

    #[arg(long, env = "MEDCALL_TURN_USERNAME")]
    pub turn_username: Option<String>,

    #[arg(long, env = "MEDCALL_TURN_CREDENTIAL")]
    pub turn_credential: Option<String>,

    /// Let a reconnecting participant replace its stale handle instead of
    /// being rejected.
    #[arg(
        long,
        env = "MEDCALL_REPLACE_STALE",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub replace_stale: bool,
}

impl ServerConfig {
    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        if self.ice_urls.is_empty() {
            return default_ice_servers();
        }

        vec![IceServerConfig {
            urls: self.ice_urls.clone(),
            username: self.turn_username.clone(),
            credential: self.turn_credential.clone(),
        }]
    }

    pub fn replacement_policy(&self) -> ReplacementPolicy {
        if self.replace_stale {
            ReplacementPolicy::ReplaceStale
        } else {
            ReplacementPolicy::Reject
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            ice_urls: Vec::new(),
            turn_username: None,
            turn_credential: None,
            replace_stale: true,
        }
    }
}
