use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Scan-level abort switch. Work already collected stays valid once it trips;
/// loops only stop picking up new frontier entries, URLs or payloads.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
