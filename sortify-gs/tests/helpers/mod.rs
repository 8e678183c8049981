//! Shared test utilities
//!
//! Synthetic, well-separated genre data and an in-memory music service that
//! records every playlist change.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sortify_gs::services::{MusicService, PlaylistSummary, ServiceError};
use sortify_gs::{train_classifier, ForestParams, GenreClassifier, RawTrackRecord, FEATURE_NAMES};
use std::collections::HashMap;
use std::sync::Mutex;

/// Feature values for the `i`-th synthetic track of a genre
///
/// Rock is loud and energetic, jazz is acoustic and quiet; the jitter keeps
/// rows distinct without letting the two clusters overlap.
pub fn feature_values(genre: &str, i: usize) -> [f64; 10] {
    let jitter = (i % 7) as f64 * 0.01;
    match genre {
        "rock" => [
            0.05 + jitter,
            0.50 + jitter,
            210_000.0 + (i % 11) as f64 * 1000.0,
            0.90 - jitter,
            0.10 + jitter,
            0.30,
            -5.0 + jitter,
            0.05,
            140.0 + jitter * 10.0,
            0.60,
        ],
        "jazz" => [
            0.85 - jitter,
            0.40 + jitter,
            320_000.0 + (i % 11) as f64 * 1000.0,
            0.20 + jitter,
            0.60 - jitter,
            0.10,
            -16.0 + jitter,
            0.04,
            95.0 + jitter * 10.0,
            0.40,
        ],
        other => panic!("no synthetic features for {}", other),
    }
}

/// Raw training records whose first genre phrase ends in `genre`
pub fn training_records(phrase: &str, genre: &str, n: usize) -> Vec<RawTrackRecord> {
    (0..n)
        .map(|i| {
            let fields: HashMap<String, String> = FEATURE_NAMES
                .iter()
                .zip(feature_values(genre, i))
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            RawTrackRecord::new(vec![phrase.to_string()], fields)
        })
        .collect()
}

/// Small forest trained on 30 rock and 30 jazz tracks
pub fn trained_classifier() -> GenreClassifier {
    let mut records = training_records("hard rock", "rock", 30);
    records.extend(training_records("cool jazz", "jazz", 30));
    train_classifier(&records, 10, small_forest()).expect("training should succeed")
}

pub fn small_forest() -> ForestParams {
    ForestParams {
        n_trees: 15,
        max_depth: 10,
        seed: 42,
    }
}

/// Audio-feature response as the service returns it
pub fn audio_features(track_id: &str, genre: &str, i: usize) -> Value {
    let mut object = Map::new();
    for (name, value) in FEATURE_NAMES.iter().zip(feature_values(genre, i)) {
        object.insert(name.to_string(), json!(value));
    }
    object.insert("id".to_string(), json!(track_id));
    object.insert("type".to_string(), json!("audio_features"));
    object.insert("key".to_string(), json!(5));
    Value::Object(object)
}

/// Saved-track wrapper around a track id
pub fn saved_track(track_id: &str) -> Value {
    json!({
        "added_at": "2021-03-14T09:26:53Z",
        "track": { "id": track_id, "name": format!("Track {}", track_id) }
    })
}

#[derive(Debug, Default)]
struct FakeState {
    playlists: Vec<PlaylistSummary>,
    created: Vec<String>,
    added: Vec<(String, Vec<String>)>,
    saved_track_calls: Vec<(usize, usize)>,
    list_calls: usize,
}

/// In-memory music service
pub struct FakeMusicService {
    /// Saved library: (track id, genre the features are drawn from)
    library: Vec<(String, String)>,
    /// Drop the last audio-feature response of every request
    pub truncate_features: bool,
    /// Replace this library position with a wrapper lacking its track
    pub broken_position: Option<usize>,
    state: Mutex<FakeState>,
}

impl FakeMusicService {
    pub fn new(library: Vec<(String, String)>) -> Self {
        Self {
            library,
            truncate_features: false,
            broken_position: None,
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Library of `n` tracks alternating rock, jazz, rock, ...
    pub fn alternating(n: usize) -> Self {
        let library = (0..n)
            .map(|i| {
                let genre = if i % 2 == 0 { "rock" } else { "jazz" };
                (format!("t{:03}", i), genre.to_string())
            })
            .collect();
        Self::new(library)
    }

    pub fn with_playlists(self, playlists: Vec<PlaylistSummary>) -> Self {
        self.state.lock().unwrap().playlists = playlists;
        self
    }

    pub fn created(&self) -> Vec<String> {
        self.state.lock().unwrap().created.clone()
    }

    /// Every add call as (playlist id, track ids)
    pub fn added(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().added.clone()
    }

    /// All tracks added to a playlist, in order
    pub fn tracks_in(&self, playlist_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .added
            .iter()
            .filter(|(id, _)| id == playlist_id)
            .flat_map(|(_, tracks)| tracks.iter().cloned())
            .collect()
    }

    pub fn playlist_id(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .playlists
            .iter()
            .rev()
            .find(|p| p.name == name)
            .map(|p| p.id.clone())
    }

    pub fn saved_track_calls(&self) -> Vec<(usize, usize)> {
        self.state.lock().unwrap().saved_track_calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    fn genre_of(&self, track_id: &str) -> Option<(usize, &str)> {
        self.library
            .iter()
            .position(|(id, _)| id == track_id)
            .map(|i| (i, self.library[i].1.as_str()))
    }
}

#[async_trait]
impl MusicService for FakeMusicService {
    async fn list_user_playlists(&self) -> Result<Vec<PlaylistSummary>, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        Ok(state.playlists.clone())
    }

    async fn create_playlist(&self, name: &str) -> Result<String, ServiceError> {
        let mut state = self.state.lock().unwrap();
        let id = format!("pl{}", state.playlists.len() + 1);
        state.playlists.push(PlaylistSummary::new(name, id.clone()));
        state.created.push(name.to_string());
        Ok(id)
    }

    async fn add_items_to_playlist(
        &self,
        playlist_id: &str,
        item_ids: &[String],
    ) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        if !state.playlists.iter().any(|p| p.id == playlist_id) {
            return Err(ServiceError::Api(404, format!("no playlist {}", playlist_id)));
        }
        state.added.push((playlist_id.to_string(), item_ids.to_vec()));
        Ok(())
    }

    async fn fetch_saved_tracks(&self, offset: usize, limit: usize) -> Result<Vec<Value>, ServiceError> {
        self.state.lock().unwrap().saved_track_calls.push((offset, limit));
        let page = self
            .library
            .iter()
            .enumerate()
            .skip(offset)
            .take(limit)
            .map(|(i, (id, _))| {
                if self.broken_position == Some(i) {
                    json!({ "added_at": "2021-03-14T09:26:53Z" })
                } else {
                    saved_track(id)
                }
            })
            .collect();
        Ok(page)
    }

    async fn fetch_audio_features(&self, track_ids: &[String]) -> Result<Vec<Value>, ServiceError> {
        let mut responses: Vec<Value> = track_ids
            .iter()
            .map(|id| match self.genre_of(id) {
                Some((i, genre)) => audio_features(id, genre, i),
                None => Value::Null,
            })
            .collect();
        if self.truncate_features {
            responses.pop();
        }
        Ok(responses)
    }
}

/// Write a training CSV with `n` rows per (genre phrase, feature genre) pair
///
/// Rows carry extra columns and a secondary genre, like real exports do.
pub fn write_dataset(path: &std::path::Path, groups: &[(&str, &str, usize)]) {
    let mut csv = String::from("id,name,genres,");
    csv.push_str(&FEATURE_NAMES.join(","));
    csv.push_str(",mode\n");

    let mut row = 0;
    for &(phrase, genre, n) in groups {
        for i in 0..n {
            let values: Vec<String> = feature_values(genre, i).iter().map(f64::to_string).collect();
            csv.push_str(&format!(
                "id{},Song {},\"['{}', 'alt {}']\",{},1\n",
                row,
                row,
                phrase,
                genre,
                values.join(",")
            ));
            row += 1;
        }
    }
    std::fs::write(path, csv).unwrap();
}
