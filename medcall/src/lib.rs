pub use medcall_core::{ParticipantId, Role, RoomId, SignalMessage};

pub mod model {
    pub use medcall_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use medcall_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use medcall_client::*;
}
