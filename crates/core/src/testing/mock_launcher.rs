//! Mock media launcher for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::player::{MediaLauncher, PlaybackRequest, PlayerError};

/// Mock implementation of the MediaLauncher trait.
///
/// Records every request it receives and can be told to fail.
#[derive(Debug, Default)]
pub struct MockLauncher {
    launches: Mutex<Vec<PlaybackRequest>>,
    fail: AtomicBool,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far.
    pub fn launches(&self) -> Vec<PlaybackRequest> {
        self.launches.lock().unwrap().clone()
    }

    /// Make subsequent launches return an error (they are still recorded).
    pub fn fail_launches(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.launches.lock().unwrap().clear();
    }
}

#[async_trait]
impl MediaLauncher for MockLauncher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn launch(&self, request: &PlaybackRequest) -> Result<(), PlayerError> {
        self.launches.lock().unwrap().push(request.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(PlayerError::NotFound("mock-player".to_string()));
        }
        Ok(())
    }
}
