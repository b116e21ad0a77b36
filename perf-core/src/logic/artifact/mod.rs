//! Artifact Module - Persisted training output
//!
//! # Architecture
//! - `types.rs`: `PipelineArtifact`, `TrainingSummary`, file header
//! - `validate.rs`: header/layout/bins/structure validation
//! - `storage.rs`: atomic save, checksummed load
//!
//! # File format
//! One JSON header line (magic, format version, SHA-256, payload length)
//! followed by the JSON payload. A load that fails any check is fatal for
//! the caller; there is no fallback artifact.

pub mod storage;
pub mod types;
pub mod validate;

#[cfg(test)]
mod tests;

pub use storage::{decode_artifact, encode_artifact, load_artifact, save_artifact};
pub use types::{ArtifactHeader, PipelineArtifact, TrainingSummary, ARTIFACT_MAGIC, FORMAT_VERSION};
pub use validate::{validate_artifact, ArtifactError};
