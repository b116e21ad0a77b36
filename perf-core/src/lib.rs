//! Student Performance Core
//!
//! Shared contract between the offline trainer and the HTTP service: the
//! feature layout, the fitted pipeline artifact and the predictor that
//! applies it.

pub mod constants;
pub mod logic;

pub use logic::artifact::{load_artifact, save_artifact, ArtifactError, PipelineArtifact};
pub use logic::dataset::PerformanceLevel;
pub use logic::features::StudentRecord;
pub use logic::model::{
    ClassProbabilities, EngineStatus, InferenceEngine, InferenceError, PredictionResult, Predictor,
};
pub use logic::training::{TrainingConfig, TrainingOutcome};
