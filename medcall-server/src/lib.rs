mod app_state;
mod config;
mod room;
mod signaling;

pub use app_state::*;
pub use config::*;
pub use room::*;
pub use signaling::*;
