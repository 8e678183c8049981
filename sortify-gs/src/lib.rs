//! sortify-gs library interface
//!
//! Genre Sorter: trains a genre classifier on a labeled audio-feature dataset
//! and sorts a user's saved tracks into genre playlists.
//!
//! Classification pipeline:
//! - [`training_table`]: raw records → feature vectors + canonical genres
//! - [`classifier`]: random forest, trained once, batch inference
//! - [`feature_extractor`]: service responses → feature vectors / track ids
//! - [`bucketer`]: track ids grouped by predicted genre
//!
//! Around it: [`dataset`] loading, the [`services`] client, playlist
//! [`router`] and the batch [`sorter`].

pub mod bucketer;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_extractor;
pub mod router;
pub mod services;
pub mod sorter;
pub mod training_table;
pub mod types;

use crate::config::RunConfig;
use crate::dataset::load_dataset;
use crate::router::PlaylistDirectory;
use crate::services::MusicService;
use crate::sorter::{GenreSorter, SortSummary};
use tracing::info;

pub use crate::bucketer::{bucket_by_genre, GenreBuckets};
pub use crate::classifier::{ForestParams, GenreClassifier, TrainedModel};
pub use crate::error::{GenreError, SortError, SortResult};
pub use crate::feature_extractor::{extract_feature_batch, extract_features, extract_track_ids};
pub use crate::training_table::{build_training_table, RawTrackRecord, TrainingTable};
pub use crate::types::{CanonicalGenre, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

/// Build the training table and fit a classifier on it
pub fn train_classifier(
    records: &[RawTrackRecord],
    min_tracks: usize,
    params: ForestParams,
) -> Result<GenreClassifier, GenreError> {
    let table = build_training_table(records, min_tracks)?;
    let mut classifier = GenreClassifier::new(params);
    classifier.train(&table.features, &table.labels)?;
    Ok(classifier)
}

/// One complete sorting run: load the dataset, train, then sort the
/// configured window of saved tracks
///
/// Dry runs never touch the service's playlists, not even to list them.
pub async fn sort_library<S: MusicService + ?Sized>(
    service: &S,
    run: &RunConfig,
) -> SortResult<SortSummary> {
    let records = load_dataset(&run.dataset_path)?;

    let classifier = train_classifier(&records, run.min_tracks, run.forest)?;

    let mut directory = if run.sort.dry_run {
        info!("Dry run: playlists will not be modified");
        PlaylistDirectory::new()
    } else {
        let playlists = service.list_user_playlists().await?;
        info!(count = playlists.len(), "Loaded existing playlists");
        PlaylistDirectory::from_playlists(playlists)
    };

    GenreSorter::new(service, &classifier, run.naming.clone(), run.sort.clone())
        .run(&mut directory)
        .await
}
