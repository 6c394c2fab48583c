
pub use mock_admission::*;
pub use mock_signaling::*;
