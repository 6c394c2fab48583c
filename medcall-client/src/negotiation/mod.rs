mod negotiation;
mod negotiation_state;
mod pending_ice_queue;
mod protocol_violation;

pub use negotiation::*;
pub use negotiation_state::*;
pub use pending_ice_queue::*;
pub use protocol_violation::*;
