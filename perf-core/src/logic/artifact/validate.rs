use std::path::PathBuf;

use crate::logic::dataset::BINS_VERSION;
use crate::logic::features::layout::{validate_layout, LayoutMismatchError};
use crate::logic::model::ModelError;
use crate::logic::preprocess::PreprocessError;

use super::types::{ArtifactHeader, PipelineArtifact, ARTIFACT_MAGIC, FORMAT_VERSION};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("artifact has no header line")]
    MissingHeader,
    #[error("not a pipeline artifact (magic '{0}')")]
    BadMagic(String),
    #[error("unsupported artifact format v{actual}, expected v{expected}")]
    UnsupportedFormat { expected: u32, actual: u32 },
    #[error("payload is {actual} bytes, header says {expected}")]
    Truncated { expected: u64, actual: u64 },
    #[error("checksum mismatch: header {expected}, payload {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),
    #[error("artifact bins v{actual} do not match running bins v{expected}")]
    BinsMismatch { expected: u8, actual: u8 },
    #[error("preprocessor is invalid: {0}")]
    Preprocessor(#[from] PreprocessError),
    #[error("forest is invalid: {0}")]
    Forest(#[from] ModelError),
    #[error("forest expects {forest} inputs but the preprocessor produces {preprocessor}")]
    WidthMismatch { forest: usize, preprocessor: usize },
}

pub fn validate_header(header: &ArtifactHeader) -> Result<(), ArtifactError> {
    if header.magic != ARTIFACT_MAGIC {
        return Err(ArtifactError::BadMagic(header.magic.clone()));
    }
    if header.format_version != FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedFormat {
            expected: FORMAT_VERSION,
            actual: header.format_version,
        });
    }
    Ok(())
}

/// Validate artifact compatibility with the running code
pub fn validate_artifact(artifact: &PipelineArtifact) -> Result<(), ArtifactError> {
    validate_layout(artifact.feature_version, artifact.layout_hash)?;

    if artifact.bins.version != BINS_VERSION {
        return Err(ArtifactError::BinsMismatch {
            expected: BINS_VERSION,
            actual: artifact.bins.version,
        });
    }

    artifact.preprocessor.check_layout()?;
    artifact.forest.validate()?;

    let width = artifact.preprocessor.output_width();
    if artifact.forest.n_features != width {
        return Err(ArtifactError::WidthMismatch {
            forest: artifact.forest.n_features,
            preprocessor: width,
        });
    }

    Ok(())
}
