//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema shared by training and serving.**
//!
//! ## Rules:
//! 1. Add a column → increment FEATURE_VERSION
//! 2. Change column order → increment FEATURE_VERSION
//! 3. Remove a column → increment FEATURE_VERSION
//!
//! Artifacts store the version and layout hash they were trained with; the
//! server refuses to load an artifact built against a different layout.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Numeric columns, in the order they enter the transform
pub const NUMERIC_FEATURES: &[&str] = &[
    "Age",                 // 0: years
    "Sleep_Duration",      // 1: hours per day
    "Study_Hours",         // 2: hours per day
    "Social_Media_Hours",  // 3: hours per day
    "Physical_Activity",   // 4: minutes per week
    "Stress_Level",        // 5: ordinal 1-10
];

/// Categorical columns, in the order they enter the transform
pub const CATEGORICAL_FEATURES: &[&str] = &[
    "Gender",      // 0: Male / Female
    "Department",  // 1: Business / Engineering / Medical / Science
];

pub const NUMERIC_COUNT: usize = 6;
pub const CATEGORICAL_COUNT: usize = 2;

/// Total number of raw (pre-encoding) features
pub const FEATURE_COUNT: usize = NUMERIC_COUNT + CATEGORICAL_COUNT;

/// Continuous score the label is derived from
pub const TARGET_COLUMN: &str = "CGPA";

/// Row identifier, carried for diagnostics only
pub const ID_COLUMN: &str = "Student_ID";

/// Vocabulary the HTTP surface accepts for each categorical column
pub const GENDER_VALUES: &[&str] = &["Male", "Female"];
pub const DEPARTMENT_VALUES: &[&str] = &["Business", "Engineering", "Medical", "Science"];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version and every column name in order
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in NUMERIC_FEATURES.iter().chain(CATEGORICAL_FEATURES) {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout information for logging and the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            numeric: NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            categorical: CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a persisted layout doesn't match the running code
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn numeric_index(name: &str) -> Option<usize> {
    NUMERIC_FEATURES.iter().position(|&n| n == name)
}

pub fn categorical_index(name: &str) -> Option<usize> {
    CATEGORICAL_FEATURES.iter().position(|&n| n == name)
}

/// Every column a training dataset must provide
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    NUMERIC_FEATURES
        .iter()
        .chain(CATEGORICAL_FEATURES)
        .copied()
        .chain(std::iter::once(TARGET_COLUMN))
}

// ============================================================================
// TESTS
// ============================================================================
