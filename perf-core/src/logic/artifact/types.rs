use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::dataset::CgpaBins;
use crate::logic::features::layout::{layout_hash, FEATURE_VERSION};
use crate::logic::model::RandomForest;
use crate::logic::preprocess::FittedPreprocessor;

/// First field of every artifact header
pub const ARTIFACT_MAGIC: &str = "student-perf-pipeline";

/// Bump when the header or payload shape changes
pub const FORMAT_VERSION: u32 = 1;

// ============================================================================
// HEADER
// ============================================================================

/// First line of an artifact file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub magic: String,
    pub format_version: u32,
    /// SHA-256 of the payload bytes, lowercase hex
    pub checksum: String,
    pub payload_bytes: u64,
}

// ============================================================================
// PIPELINE ARTIFACT
// ============================================================================

/// How the artifact was trained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub seed: u64,
    pub n_trees: usize,
    pub test_ratio: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Labelled rows per class, Low/Medium/High
    pub class_counts: [usize; 3],
    pub skipped_rows: usize,
}

/// Fitted transform plus forest; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub bins: CgpaBins,
    pub training: TrainingSummary,
    pub preprocessor: FittedPreprocessor,
    pub forest: RandomForest,
}

impl PipelineArtifact {
    pub fn new(
        bins: CgpaBins,
        training: TrainingSummary,
        preprocessor: FittedPreprocessor,
        forest: RandomForest,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            bins,
            training,
            preprocessor,
            forest,
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.forest.classes
    }
}
