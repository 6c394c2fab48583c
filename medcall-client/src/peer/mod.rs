mod negotiator_event;
mod peer_connection;
mod peer_error;
mod peer_negotiator;
mod rtc_peer_connection;

pub use negotiator_event::*;
pub use peer_connection::*;
pub use peer_error::*;
pub use peer_negotiator::*;
pub use rtc_peer_connection::*;
