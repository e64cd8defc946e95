//! Debounce primitive for keystroke-driven search.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Timer + cancel-on-superseding-input.
///
/// Each call to [`Debouncer::pass`] starts a quiet period and
/// invalidates every earlier one. Only the call that is still the
/// latest when its timer fires returns `true`; the caller runs the
/// query for that call and drops the rest.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    /// Wait out the quiet period; `true` if no newer input superseded
    /// this one in the meantime.
    pub async fn pass(&self) -> bool {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        self.generation.load(Ordering::SeqCst) == mine
    }
}
