mod appointment;
mod connection_state;
mod session_command;
mod session_config;
mod session_controller;
mod session_error;
mod session_event;
mod signaling_transport;

pub use appointment::*;
pub use connection_state::*;
pub use session_command::*;
pub use session_config::*;
pub use session_controller::*;
pub use session_error::*;
pub use session_event::*;
pub use signaling_transport::*;
