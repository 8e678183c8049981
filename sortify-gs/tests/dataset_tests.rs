//! Dataset loading tests against files on disk

mod helpers;

use sortify_gs::dataset::{load_dataset, DatasetError};
use sortify_gs::training_table::canonical_genre;
use sortify_gs::{build_training_table, FEATURE_NAMES};
use tempfile::TempDir;

#[test]
fn test_load_generated_dataset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracks.csv");
    helpers::write_dataset(&path, &[("album rock", "rock", 12), ("k-pop", "rock", 4)]);

    let records = load_dataset(&path).unwrap();

    assert_eq!(records.len(), 16);
    assert_eq!(records[0].genres, vec!["album rock", "alt rock"]);
    assert_eq!(records[12].genres, vec!["k-pop", "alt rock"]);
    assert_eq!(canonical_genre(&records[12].genres).as_deref(), Some("pop"));
    // Only feature columns are kept
    assert_eq!(records[0].fields.len(), FEATURE_NAMES.len());
    assert!(!records[0].fields.contains_key("mode"));

    let table = build_training_table(&records, 10).unwrap();
    assert_eq!(table.len(), 12);
    assert!(table.labels.iter().all(|l| l == "rock"));
}

#[test]
fn test_unlabeled_rows_load_and_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracks.csv");
    let header = format!("genres,{}", FEATURE_NAMES.join(","));
    let row = |genres: &str| format!("\"{}\",0.1,0.2,200000,0.3,0.0,0.1,-7.5,0.05,120,0.5", genres);
    let content = format!(
        "{}\n{}\n{}\n{}\n",
        header,
        row("[]"),
        row("['swing']"),
        row("[\"\"smooth jazz\"\"]")
    );
    std::fs::write(&path, content).unwrap();

    let records = load_dataset(&path).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records[0].genres.is_empty());

    let table = build_training_table(&records, 1).unwrap();
    assert_eq!(table.labels, vec!["swing", "jazz"]);
    assert_eq!(table.features[1].get(2), Some(200000.0));
}

#[test]
fn test_missing_file_is_error() {
    let dir = TempDir::new().unwrap();
    let err = load_dataset(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, DatasetError::Csv(_)));
}

#[test]
fn test_missing_genres_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracks.csv");
    std::fs::write(&path, "name,tempo\nSong,120\n").unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "genres"));
}

#[test]
fn test_bad_genre_cell_reports_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracks.csv");
    std::fs::write(&path, "genres,tempo\n['rock'],120\nrock,99\n").unwrap();

    match load_dataset(&path).unwrap_err() {
        DatasetError::GenreList { row, value, .. } => {
            assert_eq!(row, 3);
            assert_eq!(value, "rock");
        }
        other => panic!("expected GenreList error, got {:?}", other),
    }
}

#[test]
fn test_bad_genre_cell_after_multiline_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tracks.csv");
    std::fs::write(
        &path,
        "genres,name,tempo\n['rock'],\"Side A\nSide B\",120\n[jazz],Solo,99\n",
    )
    .unwrap();

    match load_dataset(&path).unwrap_err() {
        DatasetError::GenreList { row, value, .. } => {
            assert_eq!(row, 4);
            assert_eq!(value, "[jazz]");
        }
        other => panic!("expected GenreList error, got {:?}", other),
    }
}
