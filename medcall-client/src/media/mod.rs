mod local_tracks;
mod media_acquirer;
mod media_constraints;
mod media_devices;
mod media_error;
mod sleeper;

pub use local_tracks::*;
pub use media_acquirer::*;
pub use media_constraints::*;
pub use media_devices::*;
pub use media_error::*;
pub use sleeper::*;
