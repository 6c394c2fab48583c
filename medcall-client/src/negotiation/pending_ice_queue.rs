use medcall_core::IceCandidate;

/// Remote candidates that arrived before the remote description was set.
///
/// Kept in arrival order and drained exactly once.
#[derive(Debug, Default)]
pub struct PendingIceQueue {
    candidates: Vec<IceCandidate>,
}

impl PendingIceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, candidate: IceCandidate) {
        self.candidates.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn drain(&mut self) -> Vec<IceCandidate> {
        std::mem::take(&mut self.candidates)
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }
}
