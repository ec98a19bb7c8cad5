//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable that overrides the stored API key
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default)]
    pub show_console: bool,
    /// Key taken from the environment for this session; never saved
    #[serde(skip)]
    pub env_api_key: Option<String>,
}

fn default_api_base_url() -> String { "https://api.themoviedb.org/3".to_string() }
fn default_image_base_url() -> String { "https://image.tmdb.org/t/p/".to_string() }
fn default_language() -> String { "en-US".to_string() }
fn default_connect_timeout() -> u64 { 10 }
fn default_request_timeout() -> u64 { 30 }
fn default_true() -> bool { true }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            dark_mode: true,
            show_console: false,
            env_api_key: None,
        }
    }
}

impl AppConfig {
    /// Per-user directory holding config.json and the favourites record
    pub fn config_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("movie_mingle");
        path
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Load from disk, falling back to defaults, then apply the env override
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::config_path());
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.apply_api_key_override(&key);
        }
        config
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read config, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        self.save_to(&Self::config_path());
    }

    pub fn save_to(&self, path: &std::path::Path) {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).ok();
        }
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to save config");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize config"),
        }
    }

    fn apply_api_key_override(&mut self, key: &str) {
        let key = key.trim();
        if !key.is_empty() {
            self.env_api_key = Some(key.to_string());
        }
    }

    /// Key used for requests: the environment override, else the stored one
    pub fn effective_api_key(&self) -> &str {
        self.env_api_key.as_deref().unwrap_or(&self.api_key)
    }

    pub fn has_api_key(&self) -> bool {
        !self.effective_api_key().trim().is_empty()
    }
}
