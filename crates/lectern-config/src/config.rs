//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            gemini: GeminiConfig::default(),
            media: MediaConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &PathBuf) -> ConfigResult<()> {
        let default_config = Self::default_config_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config)?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Lectern Configuration
# Archive lecture recordings and ask questions about them.

[storage]
# Directory holding normalized lecture files (relative paths resolve
# against the working directory)
library_dir = "lectures"

# Catalog of indexed records
catalog_file = "lecture_data.json"

[gemini]
# Model used for requests that carry uploaded media
model = "models/gemini-2.5-flash"

# Model used for text-only requests (relevance selection, final synthesis)
text_model = "models/gemini-2.5-flash"

# Generative Language API endpoint
base_url = "https://generativelanguage.googleapis.com"

# API key. Prefer the GEMINI_API_KEY environment variable over storing
# the key here.
# api_key = ""

# Request timeout in seconds
timeout_seconds = 300

# Attempts per API call (including the first) and the fixed wait
# between them
retry_attempts = 3
retry_delay_seconds = 5

[media]
# Path to the ffmpeg binary
ffmpeg_path = "ffmpeg"
"#
        .to_string()
    }
}

/// Storage locations for the library and the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub library_dir: String,
    pub catalog_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            library_dir: "lectures".to_string(),
            catalog_file: "lecture_data.json".to_string(),
        }
    }
}

impl StorageConfig {
    /// Library directory with `~` expanded.
    pub fn library_path(&self) -> PathBuf {
        expand(&self.library_dir)
    }

    /// Catalog file with `~` expanded.
    pub fn catalog_path(&self) -> PathBuf {
        expand(&self.catalog_file)
    }
}

/// Generative Language API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub model: String,
    pub text_model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "models/gemini-2.5-flash".to_string(),
            text_model: "models/gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
            timeout_seconds: 300,
            retry_attempts: 3,
            retry_delay_seconds: 5,
        }
    }
}

impl GeminiConfig {
    /// API key from the config file, falling back to `GEMINI_API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
    }
}

/// External media tooling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub ffmpeg_path: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }
}

fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
