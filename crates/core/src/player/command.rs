//! Built-in launchers.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{MediaLauncher, PlaybackRequest, PlayerError};
use crate::config::PlayerConfig;

/// Launcher that only records the hand-off in the log.
#[derive(Debug, Default, Clone)]
pub struct TracingLauncher;

#[async_trait]
impl MediaLauncher for TracingLauncher {
    fn name(&self) -> &str {
        "log"
    }

    async fn launch(&self, request: &PlaybackRequest) -> Result<(), PlayerError> {
        info!(url = %request.url, "Play '{}'", request.title);
        Ok(())
    }
}

/// Launcher that spawns a player process with the URL as last argument.
///
/// The child is detached: its exit status is never awaited.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLauncher {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build the launcher configured in `[player]`, if a command is set.
    pub fn from_config(config: &PlayerConfig) -> Option<Self> {
        config
            .command
            .as_ref()
            .map(|program| Self::new(program.clone(), config.args.clone()))
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// Arguments for a request, URL last.
    pub fn build_args(&self, request: &PlaybackRequest) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(request.url.clone());
        args
    }
}

#[async_trait]
impl MediaLauncher for CommandLauncher {
    fn name(&self) -> &str {
        "command"
    }

    async fn launch(&self, request: &PlaybackRequest) -> Result<(), PlayerError> {
        let args = self.build_args(request);
        debug!("Spawning {} {:?}", self.program.display(), args);

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PlayerError::NotFound(self.program.display().to_string())
                } else {
                    PlayerError::SpawnFailed(e)
                }
            })?;

        info!(
            pid = child.id(),
            "Started {} for '{}'",
            self.program.display(),
            request.title
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PlaybackRequest {
        PlaybackRequest {
            url: "http://ftp.local/movies/heat.mkv".to_string(),
            title: "Heat".to_string(),
        }
    }

    #[test]
    fn test_url_is_last_argument() {
        let launcher = CommandLauncher::new("vlc", vec!["--fullscreen".to_string()]);
        assert_eq!(
            launcher.build_args(&request()),
            vec!["--fullscreen", "http://ftp.local/movies/heat.mkv"]
        );
    }

    #[test]
    fn test_from_config_requires_command() {
        let mut config = PlayerConfig::default();
        assert!(CommandLauncher::from_config(&config).is_none());

        config.command = Some(PathBuf::from("/usr/bin/mpv"));
        let launcher = CommandLauncher::from_config(&config).unwrap();
        assert_eq!(launcher.program(), &PathBuf::from("/usr/bin/mpv"));
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let launcher = CommandLauncher::new("/nonexistent/ftpflix-player", Vec::new());
        let err = launcher.launch(&request()).await.unwrap_err();
        assert!(matches!(err, PlayerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_tracing_launcher_always_succeeds() {
        assert!(TracingLauncher.launch(&request()).await.is_ok());
    }
}
