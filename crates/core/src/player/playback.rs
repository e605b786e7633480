use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{LaunchGuard, MediaLauncher, PlaybackRequest};
use crate::catalog::{ContentItem, Episode};
use crate::config::PlayerConfig;
use crate::metrics::PLAYBACK_REQUESTS;

/// Result of a play action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlaybackOutcome {
    /// The URL was handed to the launcher.
    Launched { url: String, title: String },
    /// The item is a series; the caller should offer an episode picker.
    ShowDetails { title: String },
    /// No source with a usable URL.
    NoPlayableSource { title: String },
    /// Another launch happened within the guard window.
    Suppressed { title: String },
}

impl PlaybackOutcome {
    fn label(&self) -> &'static str {
        match self {
            PlaybackOutcome::Launched { .. } => "launched",
            PlaybackOutcome::ShowDetails { .. } => "show_details",
            PlaybackOutcome::NoPlayableSource { .. } => "no_source",
            PlaybackOutcome::Suppressed { .. } => "suppressed",
        }
    }
}

/// Resolves playable URLs and hands them to a [`MediaLauncher`].
pub struct Player {
    launcher: Arc<dyn MediaLauncher>,
    guard: LaunchGuard,
}

impl Player {
    pub fn new(launcher: Arc<dyn MediaLauncher>, guard_window: Duration) -> Self {
        Self {
            launcher,
            guard: LaunchGuard::new(guard_window),
        }
    }

    pub fn from_config(launcher: Arc<dyn MediaLauncher>, config: &PlayerConfig) -> Self {
        Self::new(launcher, config.launch_guard())
    }

    pub fn launcher_name(&self) -> &str {
        self.launcher.name()
    }

    /// Play a catalog item.
    ///
    /// Movies launch the first URL of the selected source (the first source
    /// when `source_index` is `None`). Series never launch directly.
    pub async fn play_content(
        &self,
        item: &ContentItem,
        source_index: Option<usize>,
    ) -> PlaybackOutcome {
        let title = item.title().to_string();

        let outcome = if item.is_series() {
            debug!("'{}' is a series, showing details", title);
            PlaybackOutcome::ShowDetails { title }
        } else {
            let url = item
                .sources()
                .get(source_index.unwrap_or(0))
                .and_then(|source| source.first_url());
            match url {
                Some(url) => self.launch(url.to_string(), title).await,
                None => PlaybackOutcome::NoPlayableSource { title },
            }
        };

        PLAYBACK_REQUESTS
            .with_label_values(&[outcome.label()])
            .inc();
        outcome
    }

    /// Play an episode of `series_title`, shown as `"<series> - <episode>"`.
    pub async fn play_episode(&self, episode: &Episode, series_title: &str) -> PlaybackOutcome {
        let title = format!("{} - {}", series_title, episode.title);
        let outcome = match episode.first_url() {
            Some(url) => self.launch(url.to_string(), title).await,
            None => PlaybackOutcome::NoPlayableSource { title },
        };

        PLAYBACK_REQUESTS
            .with_label_values(&[outcome.label()])
            .inc();
        outcome
    }

    async fn launch(&self, url: String, title: String) -> PlaybackOutcome {
        if !self.guard.try_acquire() {
            debug!("Ignoring launch of '{}' within guard window", title);
            return PlaybackOutcome::Suppressed { title };
        }

        let request = PlaybackRequest { url, title };
        info!(
            "Handing '{}' to {} launcher",
            request.title,
            self.launcher.name()
        );
        // The hand-off has no acknowledgement; failures are only logged.
        if let Err(e) = self.launcher.launch(&request).await {
            warn!("Launcher {} failed for '{}': {}", self.launcher.name(), request.title, e);
        }

        PlaybackOutcome::Launched {
            url: request.url,
            title: request.title,
        }
    }
}
