//! sortify-gs - Genre Sorter
//!
//! Trains a random-forest genre classifier on a labeled audio-feature dataset,
//! then sorts a window of the user's saved tracks into genre playlists,
//! creating playlists that do not exist yet.

use anyhow::Result;
use clap::Parser;
use sortify_common::config::{load_toml_config, resolve_config_path, TomlConfig};
use sortify_gs::config::{CliOverrides, RunConfig};
use sortify_gs::services::SpotifyClient;
use sortify_gs::sort_library;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sortify-gs")]
#[command(about = "Sort saved tracks into genre playlists")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SORTIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Labeled training dataset (CSV)
    #[arg(short, long, env = "SORTIFY_DATASET")]
    dataset: Option<PathBuf>,

    /// OAuth bearer token for the music service (else SORTIFY_ACCESS_TOKEN, else TOML)
    #[arg(long)]
    access_token: Option<String>,

    /// First saved track to sort
    #[arg(long)]
    offset: Option<usize>,

    /// Number of saved tracks to sort
    #[arg(long)]
    count: Option<usize>,

    /// Saved tracks fetched per batch (1-50)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Classify tracks without creating or modifying playlists
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so its log level can apply
    let config_path = resolve_config_path(args.config.as_deref());
    let toml = match &config_path {
        Some(path) => load_toml_config(path)?,
        None => TomlConfig::default(),
    };

    sortify_common::logging::init_tracing(&toml.logging.level)?;

    info!(
        "Starting sortify-gs v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Configuration: {}", path.display()),
        None => info!("No config file found, using compiled defaults"),
    }

    let run = RunConfig::resolve(
        &toml,
        &CliOverrides {
            dataset: args.dataset,
            access_token: args.access_token,
            offset: args.offset,
            count: args.count,
            batch_size: args.batch_size,
            dry_run: args.dry_run,
        },
    )?;

    let client = SpotifyClient::new(run.client.clone())?;
    let summary = sort_library(&client, &run).await?;

    println!(
        "Sorted {} tracks in {} batches{}",
        summary.tracks_sorted,
        summary.batches,
        if run.sort.dry_run { " (dry run)" } else { "" }
    );
    for (genre, count) in &summary.genre_totals {
        println!("  {:<20} {}", run.naming.playlist_name(genre), count);
    }
    if !summary.playlists_created.is_empty() {
        println!("Created playlists: {}", summary.playlists_created.join(", "));
    }

    Ok(())
}
