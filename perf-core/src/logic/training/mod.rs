//! Training Module - Offline pipeline orchestration
//!
//! CSV → labelled rows → stratified split → fitted transform + forest →
//! held-out report → atomically persisted artifact.

pub mod config;
pub mod pipeline;

pub use config::TrainingConfig;
pub use pipeline::{fit_pipeline, run, TrainingOutcome};

use crate::logic::artifact::ArtifactError;
use crate::logic::dataset::label::UnknownLevel;
use crate::logic::dataset::DatasetError;
use crate::logic::model::ModelError;
use crate::logic::preprocess::PreprocessError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("preprocessing error: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
    #[error("forest produced {0}")]
    Label(#[from] UnknownLevel),
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}
