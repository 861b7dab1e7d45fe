use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
    /// When true, feedback is POSTed to the local loopback receiver
    /// instead of the production host.
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_feedback_config")]
    pub feedback: FeedbackConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedbackConfig {
    /// Product version reported in the XML body and headers.
    #[serde(default = "default_version")]
    pub version: String,
    /// Overrides the endpoint host. Normally unset; test mode picks the
    /// loopback host and production uses the Ventuz site.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_submitted_log")]
    pub submitted_log: PathBuf,
}

fn default_prefixes() -> Vec<String> {
    vec!["!".to_string()]
}

fn default_version() -> String {
    "Ventuz X".to_string()
}

fn default_submitted_log() -> PathBuf {
    PathBuf::from("submitted.json")
}

fn default_feedback_config() -> FeedbackConfig {
    FeedbackConfig {
        version: default_version(),
        host: None,
        submitted_log: default_submitted_log(),
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// True if `content` starts with one of the configured prefixes.
    pub fn has_prefix(&self, content: &str) -> bool {
        self.prefixes.iter().any(|p| content.starts_with(p.as_str()))
    }
}
