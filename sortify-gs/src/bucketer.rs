//! Genre bucketing
//!
//! Groups track ids by predicted genre. Buckets are created on the first
//! occurrence of a genre and iterate in that order; ids keep their input order
//! inside a bucket and are never deduplicated.

use crate::error::GenreError;
use crate::types::CanonicalGenre;
use std::collections::HashMap;

/// Track ids grouped by genre, in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreBuckets {
    buckets: Vec<(CanonicalGenre, Vec<String>)>,
    index: HashMap<CanonicalGenre, usize>,
}

impl GenreBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a track id to its genre's bucket, creating the bucket if needed
    pub fn push(&mut self, genre: &str, track_id: String) {
        match self.index.get(genre) {
            Some(&i) => self.buckets[i].1.push(track_id),
            None => {
                self.index.insert(genre.to_string(), self.buckets.len());
                self.buckets.push((genre.to_string(), vec![track_id]));
            }
        }
    }

    pub fn get(&self, genre: &str) -> Option<&[String]> {
        self.index.get(genre).map(|&i| self.buckets[i].1.as_slice())
    }

    /// Genres in first-occurrence order
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(g, _)| g.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.buckets.iter().map(|(g, ids)| (g.as_str(), ids.as_slice()))
    }

    /// Number of genres
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of track ids across all buckets
    pub fn total_tracks(&self) -> usize {
        self.buckets.iter().map(|(_, ids)| ids.len()).sum()
    }

    pub fn into_map(self) -> HashMap<CanonicalGenre, Vec<String>> {
        self.buckets.into_iter().collect()
    }
}

/// Group index-aligned track ids and predicted genres
pub fn bucket_by_genre(
    track_ids: &[String],
    genres: &[CanonicalGenre],
) -> Result<GenreBuckets, GenreError> {
    if track_ids.len() != genres.len() {
        return Err(GenreError::LengthMismatch {
            what: "track ids vs genres",
            left: track_ids.len(),
            right: genres.len(),
        });
    }

    let mut buckets = GenreBuckets::new();
    for (id, genre) in track_ids.iter().zip(genres) {
        buckets.push(genre, id.clone());
    }
    Ok(buckets)
}
