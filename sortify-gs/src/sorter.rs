//! Library sorting run
//!
//! Walks a window of the user's saved-track library in batches. For each
//! batch: fetch saved tracks → unwrap ids → fetch audio features → extract
//! vectors → predict genres → bucket → route to playlists. An empty page ends
//! the run early. Any failure aborts the run; batches already routed stay
//! routed.

use crate::bucketer::{bucket_by_genre, GenreBuckets};
use crate::classifier::GenreClassifier;
use crate::error::{GenreError, SortResult};
use crate::feature_extractor::{extract_feature_batch, extract_track_ids};
use crate::router::{route_buckets, PlaylistDirectory, PlaylistNaming};
use crate::services::MusicService;
use sortify_common::config::{SortConfig, MAX_BATCH_SIZE};
use std::collections::BTreeMap;
use tracing::info;

/// Which part of the library to sort, and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSettings {
    /// First saved track to sort
    pub start_offset: usize,
    /// Number of saved tracks to sort
    pub track_count: usize,
    /// Saved-track page size
    pub batch_size: usize,
    /// Classify only; leave playlists untouched
    pub dry_run: bool,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            start_offset: 0,
            track_count: 20,
            batch_size: MAX_BATCH_SIZE,
            dry_run: false,
        }
    }
}

impl From<&SortConfig> for SortSettings {
    fn from(config: &SortConfig) -> Self {
        Self {
            start_offset: config.start_offset,
            track_count: config.track_count,
            batch_size: config.batch_size.clamp(1, MAX_BATCH_SIZE),
            dry_run: false,
        }
    }
}

/// Result of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Number of saved tracks fetched
    pub fetched: usize,
    pub buckets: GenreBuckets,
}

/// Totals for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSummary {
    pub batches: usize,
    pub tracks_sorted: usize,
    /// Tracks per predicted genre
    pub genre_totals: BTreeMap<String, usize>,
    /// Playlists created during the run, in creation order
    pub playlists_created: Vec<String>,
}

/// Sorts saved tracks into genre playlists
pub struct GenreSorter<'a, S: MusicService + ?Sized> {
    service: &'a S,
    classifier: &'a GenreClassifier,
    naming: PlaylistNaming,
    settings: SortSettings,
}

impl<'a, S: MusicService + ?Sized> GenreSorter<'a, S> {
    pub fn new(
        service: &'a S,
        classifier: &'a GenreClassifier,
        naming: PlaylistNaming,
        settings: SortSettings,
    ) -> Self {
        Self {
            service,
            classifier,
            naming,
            settings,
        }
    }

    /// Classify (and unless dry-running, route) one page of saved tracks
    ///
    /// Returns `None` once the library has no tracks at `offset`.
    pub async fn sort_batch(
        &self,
        offset: usize,
        limit: usize,
        directory: &mut PlaylistDirectory,
    ) -> SortResult<Option<BatchOutcome>> {
        let wrappers = self.service.fetch_saved_tracks(offset, limit).await?;
        if wrappers.is_empty() {
            return Ok(None);
        }

        let track_ids = extract_track_ids(&wrappers)?;
        let responses = self.service.fetch_audio_features(&track_ids).await?;
        if responses.len() != track_ids.len() {
            return Err(GenreError::LengthMismatch {
                what: "track ids vs audio-feature responses",
                left: track_ids.len(),
                right: responses.len(),
            }
            .into());
        }

        let vectors = extract_feature_batch(&responses)?;
        let genres = self.classifier.predict(&vectors)?;
        let buckets = bucket_by_genre(&track_ids, &genres)?;

        if !self.settings.dry_run {
            route_buckets(self.service, directory, &buckets, &self.naming).await?;
        }

        Ok(Some(BatchOutcome {
            fetched: track_ids.len(),
            buckets,
        }))
    }

    /// Sort the configured window of the library
    pub async fn run(&self, directory: &mut PlaylistDirectory) -> SortResult<SortSummary> {
        let start = self.settings.start_offset;
        // A huge count means "to the end of the library"
        let end = start.saturating_add(self.settings.track_count);
        let batch_size = self.settings.batch_size.clamp(1, MAX_BATCH_SIZE);
        let created_before = directory.created().len();

        let mut summary = SortSummary::default();
        let mut offset = start;

        while offset < end {
            let limit = batch_size.min(end - offset);
            let outcome = match self.sort_batch(offset, limit, directory).await? {
                Some(outcome) => outcome,
                None => {
                    info!(offset, "Reached end of saved library");
                    break;
                }
            };

            info!(
                batch = summary.batches + 1,
                offset,
                tracks = outcome.fetched,
                genres = outcome.buckets.len(),
                dry_run = self.settings.dry_run,
                "Batch sorted"
            );

            for (genre, ids) in outcome.buckets.iter() {
                *summary.genre_totals.entry(genre.to_string()).or_insert(0) += ids.len();
            }
            summary.batches += 1;
            summary.tracks_sorted += outcome.fetched;
            offset += outcome.fetched;
        }

        summary.playlists_created = directory.created()[created_before..].to_vec();

        info!(
            batches = summary.batches,
            tracks = summary.tracks_sorted,
            playlists_created = summary.playlists_created.len(),
            "Sorting run finished"
        );

        Ok(summary)
    }
}
