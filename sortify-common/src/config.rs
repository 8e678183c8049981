//! Configuration loading and resolution
//!
//! Bootstrap configuration lives in a single TOML file. Values are resolved with
//! the following priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing default config file is not an error: the run continues with
//! compiled defaults and a warning. An explicitly requested file that does not
//! exist is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const ENV_CONFIG_PATH: &str = "SORTIFY_CONFIG";

/// Environment variable carrying the music-service OAuth bearer token
pub const ENV_ACCESS_TOKEN: &str = "SORTIFY_ACCESS_TOKEN";

/// Default music-service API root
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Largest page the saved-tracks endpoint accepts
pub const MAX_BATCH_SIZE: usize = 50;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Labeled training dataset (CSV)
    pub dataset_path: Option<PathBuf>,

    /// OAuth bearer token for the music service
    pub access_token: Option<String>,

    /// Music-service API root URL
    pub api_base_url: String,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Training-table settings
    pub training: TrainingConfig,

    /// Random forest hyperparameters
    pub classifier: ClassifierConfig,

    /// Library sorting settings
    pub sort: SortConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            access_token: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            logging: LoggingConfig::default(),
            training: TrainingConfig::default(),
            classifier: ClassifierConfig::default(),
            sort: SortConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Training-table configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Minimum number of tracks a genre needs to stay in the training set
    pub min_tracks: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self { min_tracks: 100 }
    }
}

/// Random forest hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: usize,
    /// RNG seed for bootstrap sampling and feature subsampling
    pub seed: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            seed: 42,
        }
    }
}

/// Library sorting configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SortConfig {
    /// Position in the saved-track library to start from
    pub start_offset: usize,
    /// Number of saved tracks to sort
    pub track_count: usize,
    /// Saved-track page size (1..=50)
    pub batch_size: usize,
    /// Appended to the genre to form the playlist name
    pub playlist_suffix: String,
    /// Whether newly created playlists are public
    pub public_playlists: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            start_offset: 0,
            track_count: 20,
            batch_size: MAX_BATCH_SIZE,
            playlist_suffix: " (sortify)".to_string(),
            public_playlists: true,
        }
    }
}

impl TomlConfig {
    /// Reject values the rest of the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.sort.batch_size == 0 || self.sort.batch_size > MAX_BATCH_SIZE {
            return Err(Error::Config(format!(
                "sort.batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.sort.batch_size
            )));
        }
        if self.classifier.n_trees == 0 {
            return Err(Error::Config("classifier.n_trees must be at least 1".to_string()));
        }
        if self.classifier.max_depth == 0 {
            return Err(Error::Config("classifier.max_depth must be at least 1".to_string()));
        }
        if self.training.min_tracks == 0 {
            return Err(Error::Config("training.min_tracks must be at least 1".to_string()));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Default config file location for the platform
///
/// `~/.config/sortify/config.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sortify").join("config.toml"))
}

/// Resolve which config file to read, if any
///
/// Returns `None` when no explicit file was requested and the default file does
/// not exist.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Default location, only if present
    default_config_path().filter(|p| p.exists())
}

/// Read and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Validate a secret value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Pick the first valid token from sources in priority order
///
/// Returns the winning source, the token, and the lower-priority sources that
/// carry a *different* valid token. A source repeating the winning value is
/// not reported as shadowed.
fn pick_access_token(
    candidates: Vec<(&'static str, Option<String>)>,
) -> Option<(&'static str, String, Vec<&'static str>)> {
    let mut valid = candidates
        .into_iter()
        .filter_map(|(source, key)| key.filter(|k| is_valid_key(k)).map(|k| (source, k)));

    let (source, key) = valid.next()?;
    let shadowed = valid.filter(|(_, k)| *k != key).map(|(s, _)| s).collect();
    Some((source, key, shadowed))
}

/// Resolve the access token
///
/// **Priority:** CLI → ENV → TOML
pub fn resolve_access_token(cli_arg: Option<&str>, config: &TomlConfig) -> Result<String> {
    let candidates = vec![
        ("command line", cli_arg.map(str::to_string)),
        ("environment", std::env::var(ENV_ACCESS_TOKEN).ok()),
        ("TOML", config.access_token.clone()),
    ];

    match pick_access_token(candidates) {
        Some((source, key, shadowed)) => {
            if !shadowed.is_empty() {
                warn!(
                    "Access token also set in: {}. Using {} (highest priority).",
                    shadowed.join(", "),
                    source
                );
            }
            info!("Access token loaded from {}", source);
            Ok(key)
        }
        None => Err(Error::Config(format!(
            "Access token not configured. Provide one of:\n\
             1. Command line: --access-token <token>\n\
             2. Environment: {}=<token>\n\
             3. TOML config: access_token = \"<token>\"",
            ENV_ACCESS_TOKEN
        ))),
    }
}
