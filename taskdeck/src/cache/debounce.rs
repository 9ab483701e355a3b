//! Keystroke debouncing for the search term.
//!
//! Each submission restarts the settle delay; only a submission that is
//! still the newest when its delay elapses becomes the settled value.
//! The timer is the one explicit cancellation point in the client: a
//! superseded submission simply resolves to `false`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;

/// Debounces a stream of string values down to the last settled one.
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
    settled: RwLock<String>,
}

impl Debouncer {
    /// Creates a debouncer with the given settle delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
            settled: RwLock::new(String::new()),
        }
    }

    /// Submits a new value, waiting out the settle delay.
    ///
    /// Returns `true` if the value settled (no newer submission arrived
    /// while waiting) and is now the debouncer's settled value; `false`
    /// if it was superseded.
    pub async fn submit(&self, value: &str) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        *self.settled.write() = value.to_string();
        true
    }

    /// The last settled value; empty when nothing has settled yet.
    #[must_use]
    pub fn settled(&self) -> String {
        self.settled.read().clone()
    }

    /// Clears the settled value and invalidates in-flight submissions.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.settled.write().clear();
    }
}
