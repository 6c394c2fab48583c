mod media;
mod negotiation;
mod peer;
mod session;

pub use media::*;
pub use negotiation::*;
pub use peer::*;
pub use session::*;
