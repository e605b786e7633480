//! Hand-off of playable URLs to an external media player.
//!
//! The core never plays media itself. It resolves a URL for a content item
//! or episode and passes it to a [`MediaLauncher`], suppressing repeated
//! launches that arrive within a short window.

mod command;
mod guard;
mod playback;

pub use command::{CommandLauncher, TracingLauncher};
pub use guard::LaunchGuard;
pub use playback::{PlaybackOutcome, Player};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a launcher.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player executable not found: {0}")]
    NotFound(String),

    #[error("Failed to start player: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

/// A URL and the title to show for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackRequest {
    pub url: String,
    pub title: String,
}

/// Trait for handing a URL to an external player.
///
/// Launching is fire-and-forget: success means the hand-off was made, not
/// that playback started.
#[async_trait]
pub trait MediaLauncher: Send + Sync {
    /// Launcher name for logging.
    fn name(&self) -> &str;

    async fn launch(&self, request: &PlaybackRequest) -> Result<(), PlayerError>;
}
