//! Teardown signalling for page-scoped async flows.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Gates every post-await state mutation in a page flow.
///
/// Navigation can tear a page down while one of its requests is still
/// in flight; the response must then be discarded, not applied to a
/// flow nobody is looking at. Clones share the flag, so the page keeps
/// one clone and deactivates it on teardown.
#[derive(Debug, Clone)]
pub struct ActiveFlag {
    active: Arc<AtomicBool>,
}

impl ActiveFlag {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark the owning page as torn down.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

impl Default for ActiveFlag {
    fn default() -> Self {
        Self::new()
    }
}
