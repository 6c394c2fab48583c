pub mod recording_transport;

pub use fake_media::*;
pub use fake_peer::*;
pub use recording_transport::*;
