use std::io::Cursor;

use super::storage::{decode_artifact, encode_artifact, load_artifact, save_artifact};
use super::types::{ArtifactHeader, PipelineArtifact, TrainingSummary, ARTIFACT_MAGIC, FORMAT_VERSION};
use super::validate::{validate_artifact, ArtifactError};
use crate::logic::dataset::{CgpaBins, BINS_VERSION};
use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};
use crate::logic::features::StudentRecord;
use crate::logic::features::FeatureRow;
use crate::logic::model::{ForestParams, InferenceEngine, Predictor, RandomForest};
use crate::logic::preprocess::FittedPreprocessor;

fn record(age: f64, gender: &str, department: &str, study: f64) -> StudentRecord {
    StudentRecord {
        age,
        gender: gender.to_string(),
        department: department.to_string(),
        sleep_duration: 7.0,
        study_hours: study,
        social_media_hours: 3.0,
        physical_activity: 45.0,
        stress_level: 5.0,
    }
}

fn sample_artifact() -> PipelineArtifact {
    let records = [
        (record(19.0, "Male", "Science", 1.0), "Low"),
        (record(20.0, "Female", "Business", 1.5), "Low"),
        (record(21.0, "Male", "Medical", 4.0), "Medium"),
        (record(22.0, "Female", "Science", 4.5), "Medium"),
        (record(23.0, "Male", "Engineering", 8.0), "High"),
        (record(24.0, "Female", "Medical", 8.5), "High"),
    ];
    let rows: Vec<FeatureRow> = records.iter().map(|(r, _)| r.to_feature_row()).collect();
    let refs: Vec<&FeatureRow> = rows.iter().collect();
    let labels: Vec<&str> = records.iter().map(|(_, l)| *l).collect();

    let preprocessor = FittedPreprocessor::fit(&refs).unwrap();
    let x = preprocessor.transform(&refs).unwrap();
    let params = ForestParams {
        n_trees: 5,
        ..ForestParams::default()
    };
    let forest = RandomForest::fit(x.view(), &labels, params).unwrap();

    let training = TrainingSummary {
        seed: params.seed,
        n_trees: 5,
        test_ratio: 0.2,
        train_rows: 6,
        test_rows: 0,
        class_counts: [2, 2, 2],
        skipped_rows: 0,
    };
    PipelineArtifact::new(CgpaBins::default(), training, preprocessor, forest)
}

fn split_encoded(bytes: &[u8]) -> (ArtifactHeader, Vec<u8>) {
    let newline = bytes.iter().position(|b| *b == b'\n').unwrap();
    let header = serde_json::from_slice(&bytes[..newline]).unwrap();
    (header, bytes[newline + 1..].to_vec())
}

fn join_encoded(header: &ArtifactHeader, payload: &[u8]) -> Vec<u8> {
    let mut out = serde_json::to_vec(header).unwrap();
    out.push(b'\n');
    out.extend_from_slice(payload);
    out
}

#[test]
fn test_artifact_creation() {
    let artifact = sample_artifact();
    assert_eq!(artifact.feature_version, FEATURE_VERSION);
    assert_eq!(artifact.layout_hash, layout_hash());
    assert_eq!(artifact.bins.version, BINS_VERSION);
    assert_eq!(artifact.classes(), ["High", "Low", "Medium"]);
    assert!(validate_artifact(&artifact).is_ok());
}

#[test]
fn test_save_load_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model").join("performance_model.json");

    let original = sample_artifact();
    save_artifact(&original, &path).unwrap();
    let loaded = load_artifact(&path).unwrap();

    assert_eq!(loaded, original);

    // Only the artifact itself is left behind
    let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_loaded_artifact_predicts_like_original() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.json");
    let original = sample_artifact();
    save_artifact(&original, &path).unwrap();

    let a = Predictor::from_artifact(original).unwrap();
    let b = Predictor::from_artifact(load_artifact(&path).unwrap()).unwrap();
    let input = record(20.5, "Female", "Engineering", 5.0);

    assert_eq!(a.predict(&input).unwrap(), b.predict(&input).unwrap());
    assert_eq!(b.status().n_trees, 5);
}

#[test]
fn test_overwrite_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.json");

    let first = sample_artifact();
    let second = sample_artifact();
    save_artifact(&first, &path).unwrap();
    save_artifact(&second, &path).unwrap();

    assert_eq!(load_artifact(&path).unwrap().id, second.id);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_artifact(&dir.path().join("nope.json"));
    assert!(matches!(result, Err(ArtifactError::NotFound(_))));
}

#[test]
fn test_reject_corrupted_payload() {
    let bytes = encode_artifact(&sample_artifact()).unwrap();
    let (header, mut payload) = split_encoded(&bytes);
    let mid = payload.len() / 2;
    payload[mid] ^= 0x01;

    let result = decode_artifact(Cursor::new(join_encoded(&header, &payload)));
    assert!(matches!(result, Err(ArtifactError::ChecksumMismatch { .. })));
}

#[test]
fn test_reject_truncated_payload() {
    let bytes = encode_artifact(&sample_artifact()).unwrap();
    let result = decode_artifact(Cursor::new(&bytes[..bytes.len() - 10]));
    assert!(matches!(result, Err(ArtifactError::Truncated { .. })));
}

#[test]
fn test_reject_bad_magic_and_format() {
    let bytes = encode_artifact(&sample_artifact()).unwrap();
    let (header, payload) = split_encoded(&bytes);

    let mut wrong_magic = header.clone();
    wrong_magic.magic = "something-else".to_string();
    assert!(matches!(
        decode_artifact(Cursor::new(join_encoded(&wrong_magic, &payload))),
        Err(ArtifactError::BadMagic(_))
    ));

    let mut future = header;
    future.format_version = FORMAT_VERSION + 1;
    assert!(matches!(
        decode_artifact(Cursor::new(join_encoded(&future, &payload))),
        Err(ArtifactError::UnsupportedFormat { .. })
    ));
    assert_eq!(ARTIFACT_MAGIC, "student-perf-pipeline");
}

#[test]
fn test_reject_missing_header() {
    assert!(matches!(
        decode_artifact(Cursor::new(Vec::<u8>::new())),
        Err(ArtifactError::MissingHeader)
    ));
}

#[test]
fn test_reject_layout_hash_mismatch() {
    let mut artifact = sample_artifact();
    artifact.layout_hash = !layout_hash();

    match validate_artifact(&artifact) {
        Err(ArtifactError::LayoutMismatch(e)) => {
            assert_eq!(e.expected_hash, layout_hash());
            assert_ne!(e.actual_hash, layout_hash());
        }
        other => panic!("expected LayoutMismatch, got {:?}", other),
    }

    // A re-checksummed payload with a bad layout still fails on load
    let bytes = encode_artifact(&artifact).unwrap();
    assert!(matches!(
        decode_artifact(Cursor::new(bytes)),
        Err(ArtifactError::LayoutMismatch(_))
    ));
}

#[test]
fn test_reject_version_and_bins_mismatch() {
    let mut artifact = sample_artifact();
    artifact.feature_version = FEATURE_VERSION + 1;
    assert!(matches!(validate_artifact(&artifact), Err(ArtifactError::LayoutMismatch(_))));

    let mut artifact = sample_artifact();
    artifact.bins.version = BINS_VERSION + 1;
    assert!(matches!(validate_artifact(&artifact), Err(ArtifactError::BinsMismatch { .. })));
}

#[test]
fn test_reject_structural_damage() {
    let mut artifact = sample_artifact();
    artifact.forest.trees.clear();
    assert!(matches!(validate_artifact(&artifact), Err(ArtifactError::Forest(_))));

    let mut artifact = sample_artifact();
    artifact.preprocessor.numeric.swap(0, 1);
    assert!(matches!(validate_artifact(&artifact), Err(ArtifactError::Preprocessor(_))));

    let mut artifact = sample_artifact();
    artifact.preprocessor.categorical[1].encoder.vocabulary.pop();
    assert!(matches!(validate_artifact(&artifact), Err(ArtifactError::WidthMismatch { .. })));
}
