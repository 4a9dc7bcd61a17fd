use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_LOOKAHEAD_SEASONS: usize = 2;
pub const DEFAULT_MANAGED_MARKER: &str = "[managed]";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub rollover: RolloverConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    /// Base URL of the media server; empty means discover it through plex.tv
    #[serde(default)]
    pub server_url: String,
    /// Server machine identifier used in playlist item URIs; empty means ask the server
    #[serde(default)]
    pub server_id: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolloverConfig {
    /// How many seasons with unwatched content are searched for the next episode
    #[serde(default = "default_lookahead_seasons")]
    pub lookahead_seasons: usize,
    #[serde(default = "default_managed_marker")]
    pub managed_marker: String,
    /// Rewrite playlists even when no slot changed
    #[serde(default)]
    pub rewrite_unchanged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_lookahead_seasons() -> usize {
    DEFAULT_LOOKAHEAD_SEASONS
}

fn default_managed_marker() -> String {
    DEFAULT_MANAGED_MARKER.to_string()
}

fn default_schedule() -> String {
    "0 0 */6 * * *".to_string()  // Every 6 hours (seconds field first)
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        schedule: default_schedule(),
        run_on_startup: default_true(),
    }
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            server_id: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for RolloverConfig {
    fn default() -> Self {
        Self {
            lookahead_seasons: default_lookahead_seasons(),
            managed_marker: default_managed_marker(),
            rewrite_unchanged: false,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rollover.lookahead_seasons == 0 {
            return Err(anyhow::anyhow!("lookahead_seasons must be at least 1"));
        }

        if self.rollover.managed_marker.trim().is_empty() {
            return Err(anyhow::anyhow!("managed_marker cannot be empty"));
        }

        if self.plex.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("timeout_seconds must be at least 1"));
        }

        let url = self.plex.server_url.trim();
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "Invalid Plex server_url '{}': must start with http:// or https://",
                url
            ));
        }

        Ok(())
    }

    /// Configured server URL without a trailing slash, if any
    pub fn server_url(&self) -> Option<String> {
        let url = self.plex.server_url.trim().trim_end_matches('/');
        if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        }
    }

    pub fn server_id(&self) -> Option<String> {
        let id = self.plex.server_id.trim();
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}
