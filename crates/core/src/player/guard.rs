use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Rejects a launch if another one was accepted less than `window` ago.
#[derive(Debug)]
pub struct LaunchGuard {
    window: Duration,
    last_launch: Mutex<Option<Instant>>,
}

impl LaunchGuard {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_launch: Mutex::new(None),
        }
    }

    /// Claim the guard. Returns false while a previous claim is in its window.
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut last = self
            .last_launch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match *last {
            Some(at) if now.duration_since(at) < self.window => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
