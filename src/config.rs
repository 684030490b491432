use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "TASKDESK_API_URL";
pub const TOKEN_ENV: &str = "TASKDESK_TOKEN";

fn default_api_url() -> String {
    "http://localhost:9090/api".to_string()
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("taskdesk")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TaskDeskConfig {
    pub api_url: String,
    pub debug_logging: bool,
    /// Keyring entry the API token is stored under; defaults to `api_url`.
    pub keyring_server: Option<String>,
}

impl Default for TaskDeskConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            debug_logging: false,
            keyring_server: None,
        }
    }
}

impl TaskDeskConfig {
    pub fn config_path() -> PathBuf {
        default_config_dir().join("config.json")
    }

    /// Load from the default location, falling back to defaults, then apply env overrides.
    ///
    /// Install the logger first; a broken file is only reported through `log`.
    pub fn load() -> Self {
        Self::load_or_default(&Self::config_path())
    }

    fn load_or_default(path: &Path) -> Self {
        let mut config = match Self::load_from(path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("{}; using defaults", e);
                Self::default()
            }
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url.trim().to_string();
            }
        }
        config
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, String> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
        }
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to encode config: {}", e))?;
        std::fs::write(path, text).map_err(|e| format!("Failed to write {}: {}", path.display(), e))
    }

    pub fn keyring_server(&self) -> &str {
        self.keyring_server.as_deref().unwrap_or(&self.api_url)
    }

    /// Token from the environment, if set.
    pub fn env_token() -> Option<String> {
        std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty())
    }
}
