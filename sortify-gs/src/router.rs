//! Playlist routing
//!
//! Sends each genre bucket to the playlist named after the genre, creating the
//! playlist on first use. The [`PlaylistDirectory`] carries every known
//! name → id pair across batches, so a playlist created for one batch is
//! reused by the next.

use crate::bucketer::GenreBuckets;
use crate::services::{MusicService, PlaylistSummary, ServiceError};
use std::collections::HashMap;
use tracing::{debug, info};

/// How playlists are named after genres
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistNaming {
    pub suffix: String,
}

impl PlaylistNaming {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    pub fn playlist_name(&self, genre: &str) -> String {
        format!("{}{}", genre, self.suffix)
    }
}

/// Known playlists by name, for the duration of one run
#[derive(Debug, Clone, Default)]
pub struct PlaylistDirectory {
    by_name: HashMap<String, String>,
    created: Vec<String>,
}

impl PlaylistDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the user's existing playlists
    ///
    /// If several playlists share a name, the last one listed wins.
    pub fn from_playlists(playlists: impl IntoIterator<Item = PlaylistSummary>) -> Self {
        let mut directory = Self::new();
        for playlist in playlists {
            if let Some(previous) = directory.by_name.insert(playlist.name.clone(), playlist.id) {
                debug!(name = %playlist.name, shadowed = %previous, "Duplicate playlist name");
            }
        }
        directory
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Record a playlist created during this run
    pub fn insert_created(&mut self, name: String, id: String) {
        self.by_name.insert(name.clone(), id);
        self.created.push(name);
    }

    /// Names of playlists created during this run, in creation order
    pub fn created(&self) -> &[String] {
        &self.created
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Where one bucket went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedBucket {
    pub genre: String,
    pub playlist_name: String,
    pub playlist_id: String,
    pub tracks: usize,
    pub created: bool,
}

/// Outcome of routing one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingReport {
    pub routed: Vec<RoutedBucket>,
}

impl RoutingReport {
    pub fn tracks_routed(&self) -> usize {
        self.routed.iter().map(|r| r.tracks).sum()
    }

    pub fn playlists_created(&self) -> impl Iterator<Item = &str> {
        self.routed
            .iter()
            .filter(|r| r.created)
            .map(|r| r.playlist_name.as_str())
    }
}

/// Add every bucket to its genre playlist, creating playlists as needed
///
/// Buckets are routed in first-occurrence order. The first service failure
/// aborts the batch.
pub async fn route_buckets<S>(
    service: &S,
    directory: &mut PlaylistDirectory,
    buckets: &GenreBuckets,
    naming: &PlaylistNaming,
) -> Result<RoutingReport, ServiceError>
where
    S: MusicService + ?Sized,
{
    let mut report = RoutingReport::default();

    for (genre, track_ids) in buckets.iter() {
        let playlist_name = naming.playlist_name(genre);

        let existing = directory.get(&playlist_name).map(str::to_string);
        let (playlist_id, created) = match existing {
            Some(id) => (id, false),
            None => {
                let id = service.create_playlist(&playlist_name).await?;
                info!(playlist = %playlist_name, id = %id, "Created playlist");
                directory.insert_created(playlist_name.clone(), id.clone());
                (id, true)
            }
        };

        service.add_items_to_playlist(&playlist_id, track_ids).await?;
        debug!(playlist = %playlist_name, tracks = track_ids.len(), "Added tracks");

        report.routed.push(RoutedBucket {
            genre: genre.to_string(),
            playlist_name,
            playlist_id,
            tracks: track_ids.len(),
            created,
        });
    }

    Ok(report)
}
