/// Player configuration
use crate::error::{PlayerError, Result};
use rotary_playback::QueueSettings;
use rotary_server_client::ServerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest accepted prefetch depth
pub const MAX_TARGET_DEPTH: usize = 50;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_backend")]
    pub backend: BackendSettings,

    /// Queue, prefetch and fetch settings
    #[serde(default)]
    pub queue: QueueSettings,

    /// Playlists enabled at startup; empty means "ask the backend"
    #[serde(default)]
    pub playlists: Vec<String>,

    /// Send now-playing and played reports
    #[serde(default = "default_enabled")]
    pub scrobble: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendSettings {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub token: Option<String>,

    /// Play audio from stream URLs instead of downloading it first
    #[serde(default)]
    pub stream_audio: bool,
}

impl PlayerConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `config.toml` in the working
    /// directory is used when present. Environment variables prefixed with
    /// `ROTARY_` override file values, with `__` between nested keys
    /// (`ROTARY_BACKEND__URL`, `ROTARY_QUEUE__TARGET_DEPTH`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from("config.toml");
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ROTARY")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("playlists")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.backend.url.trim();
        if url.is_empty() {
            return Err(PlayerError::Config(
                "Backend URL is required (set ROTARY_BACKEND__URL)".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PlayerError::Config(format!(
                "Backend URL must start with http:// or https://, got {url:?}"
            )));
        }

        if self.queue.target_depth == 0 || self.queue.target_depth > MAX_TARGET_DEPTH {
            return Err(PlayerError::Config(format!(
                "queue.target_depth must be between 1 and {MAX_TARGET_DEPTH}"
            )));
        }

        if let (Some(min), Some(max)) = (
            self.queue.filters.min_duration,
            self.queue.filters.max_duration,
        ) {
            if min > max {
                return Err(PlayerError::Config(format!(
                    "min_duration ({min}) is larger than max_duration ({max})"
                )));
            }
        }

        Ok(())
    }

    /// Connection settings for the backend client
    pub fn server_config(&self) -> ServerConfig {
        let mut config = ServerConfig::new(self.backend.url.trim()).streaming(self.backend.stream_audio);
        if let Some(token) = self.backend.token.as_deref().filter(|t| !t.is_empty()) {
            config = config.with_token(token);
        }
        config
    }
}

// Default values
fn default_backend() -> BackendSettings {
    BackendSettings {
        url: default_url(),
        token: None,
        stream_audio: false,
    }
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_enabled() -> bool {
    true
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            queue: QueueSettings::default(),
            playlists: Vec::new(),
            scrobble: default_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queue.target_depth, 3);
        assert!(config.scrobble);
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut config = PlayerConfig::default();
        config.backend.url = "music.example.com".to_string();
        assert!(matches!(config.validate(), Err(PlayerError::Config(_))));

        config.backend.url = "  ".to_string();
        assert!(matches!(config.validate(), Err(PlayerError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_depth() {
        let mut config = PlayerConfig::default();
        config.queue.target_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_duration_filter() {
        let mut config = PlayerConfig::default();
        config.queue.filters.min_duration = Some(300);
        config.queue.filters.max_duration = Some(120);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
playlists = ["Rock", "Jazz"]
scrobble = false

[backend]
url = "https://music.example.com"
token = "secret"

[queue]
target_depth = 5
removal_policy = "rotate"

[queue.filters]
exclude_tags = ["christmas"]
"#
        )
        .unwrap();

        let config = PlayerConfig::load(Some(file.path())).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.playlists, vec!["Rock", "Jazz"]);
        assert!(!config.scrobble);
        assert_eq!(config.queue.target_depth, 5);
        assert_eq!(config.queue.history_size, 10);
        assert_eq!(config.queue.filters.exclude_tags, vec!["christmas"]);

        let server = config.server_config();
        assert_eq!(server.url, "https://music.example.com");
        assert_eq!(server.access_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = PlayerConfig::load(Some(Path::new("/nonexistent/rotary.toml")));
        assert!(matches!(result, Err(PlayerError::Config(_))));
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let mut config = PlayerConfig::default();
        config.backend.token = Some(String::new());
        assert!(config.server_config().access_token.is_none());
    }
}
