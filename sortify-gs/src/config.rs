//! Run configuration for sortify-gs
//!
//! Merges command-line overrides on top of the bootstrap TOML configuration
//! into the settings one sorting run needs.
//!
//! **Priority:** CLI → ENV → TOML → compiled default

use crate::classifier::ForestParams;
use crate::router::PlaylistNaming;
use crate::services::SpotifyClientConfig;
use crate::sorter::SortSettings;
use sortify_common::config::{resolve_access_token, TomlConfig, MAX_BATCH_SIZE};
use sortify_common::{Error, Result};
use std::path::PathBuf;

/// Command-line values that override the TOML configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dataset: Option<PathBuf>,
    pub access_token: Option<String>,
    pub offset: Option<usize>,
    pub count: Option<usize>,
    pub batch_size: Option<usize>,
    pub dry_run: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dataset_path: PathBuf,
    pub min_tracks: usize,
    pub forest: ForestParams,
    pub sort: SortSettings,
    pub naming: PlaylistNaming,
    pub client: SpotifyClientConfig,
}

impl RunConfig {
    pub fn resolve(toml: &TomlConfig, cli: &CliOverrides) -> Result<Self> {
        let dataset_path = cli
            .dataset
            .clone()
            .or_else(|| toml.dataset_path.clone())
            .ok_or_else(|| {
                Error::Config(
                    "Training dataset not configured. Pass --dataset <path> or set \
                     dataset_path in the TOML config"
                        .to_string(),
                )
            })?;

        let mut sort = SortSettings::from(&toml.sort);
        if let Some(offset) = cli.offset {
            sort.start_offset = offset;
        }
        if let Some(count) = cli.count {
            sort.track_count = count;
        }
        if let Some(batch_size) = cli.batch_size {
            if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
                return Err(Error::InvalidInput(format!(
                    "--batch-size must be between 1 and {}, got {}",
                    MAX_BATCH_SIZE, batch_size
                )));
            }
            sort.batch_size = batch_size;
        }
        sort.dry_run = cli.dry_run;

        let access_token = resolve_access_token(cli.access_token.as_deref(), toml)?;
        let mut client = SpotifyClientConfig::new(toml.api_base_url.clone(), access_token);
        client.public_playlists = toml.sort.public_playlists;

        Ok(Self {
            dataset_path,
            min_tracks: toml.training.min_tracks,
            forest: ForestParams::from(&toml.classifier),
            sort,
            naming: PlaylistNaming::new(toml.sort.playlist_suffix.clone()),
            client,
        })
    }
}
