use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::types::{ArtifactHeader, PipelineArtifact, ARTIFACT_MAGIC, FORMAT_VERSION};
use super::validate::{validate_artifact, validate_header, ArtifactError};

fn checksum(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

/// Serialize header line + payload
pub fn encode_artifact(artifact: &PipelineArtifact) -> Result<Vec<u8>, ArtifactError> {
    let payload = serde_json::to_vec(artifact)?;
    let header = ArtifactHeader {
        magic: ARTIFACT_MAGIC.to_string(),
        format_version: FORMAT_VERSION,
        checksum: checksum(&payload),
        payload_bytes: payload.len() as u64,
    };

    let mut out = serde_json::to_vec(&header)?;
    out.push(b'\n');
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Parse and fully validate an encoded artifact
pub fn decode_artifact<R: Read>(source: R) -> Result<PipelineArtifact, ArtifactError> {
    let mut reader = BufReader::new(source);

    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 || !line.ends_with('\n') {
        return Err(ArtifactError::MissingHeader);
    }
    let header: ArtifactHeader = serde_json::from_str(line.trim_end())?;
    validate_header(&header)?;

    let mut payload = Vec::new();
    reader.read_to_end(&mut payload)?;
    if payload.len() as u64 != header.payload_bytes {
        return Err(ArtifactError::Truncated {
            expected: header.payload_bytes,
            actual: payload.len() as u64,
        });
    }

    let actual = checksum(&payload);
    if actual != header.checksum {
        return Err(ArtifactError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }

    let artifact: PipelineArtifact = serde_json::from_slice(&payload)?;
    validate_artifact(&artifact)?;
    Ok(artifact)
}

/// Save artifact atomically: temp file beside the target, fsync, rename
pub fn save_artifact(artifact: &PipelineArtifact, path: &Path) -> Result<(), ArtifactError> {
    let bytes = encode_artifact(artifact)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ArtifactError::Io(e.error))?;

    log::info!(
        "Saved artifact {} ({} bytes, {} trees) to {}",
        artifact.id,
        bytes.len(),
        artifact.forest.n_trees(),
        path.display()
    );
    Ok(())
}

/// Load artifact from disk with validation
pub fn load_artifact(path: &Path) -> Result<PipelineArtifact, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }

    let file = fs::File::open(path)?;
    let artifact = decode_artifact(file)?;

    log::info!(
        "Loaded artifact {} v{} (hash: {:08x}, trees: {}, classes: {:?})",
        artifact.id,
        artifact.feature_version,
        artifact.layout_hash,
        artifact.forest.n_trees(),
        artifact.forest.classes
    );
    Ok(artifact)
}
