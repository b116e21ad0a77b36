//! Student Record and Feature Row
//!
//! `StudentRecord` is the complete, typed input of one prediction.
//! `FeatureRow` is the raw pre-transform form shared with training, where
//! any cell may be missing and is filled by the fitted imputers.

use serde::{Deserialize, Serialize};

use super::layout::{CATEGORICAL_COUNT, NUMERIC_COUNT};

// ============================================================================
// STUDENT RECORD
// ============================================================================

/// One student, as sent to `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Sleep_Duration")]
    pub sleep_duration: f64,
    #[serde(rename = "Study_Hours")]
    pub study_hours: f64,
    #[serde(rename = "Social_Media_Hours")]
    pub social_media_hours: f64,
    #[serde(rename = "Physical_Activity")]
    pub physical_activity: f64,
    #[serde(rename = "Stress_Level")]
    pub stress_level: f64,
}

impl StudentRecord {
    /// Numeric values in layout order
    pub fn numeric_values(&self) -> [f64; NUMERIC_COUNT] {
        [
            self.age,
            self.sleep_duration,
            self.study_hours,
            self.social_media_hours,
            self.physical_activity,
            self.stress_level,
        ]
    }

    /// Categorical values in layout order
    pub fn categorical_values(&self) -> [&str; CATEGORICAL_COUNT] {
        [self.gender.as_str(), self.department.as_str()]
    }

    pub fn to_feature_row(&self) -> FeatureRow {
        FeatureRow {
            numeric: self.numeric_values().map(Some),
            categorical: self.categorical_values().map(|v| Some(v.to_string())),
        }
    }
}

// ============================================================================
// FEATURE ROW
// ============================================================================

/// Raw feature cells in layout order; `None` marks a missing cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRow {
    pub numeric: [Option<f64>; NUMERIC_COUNT],
    pub categorical: [Option<String>; CATEGORICAL_COUNT],
}

impl FeatureRow {
    pub fn is_complete(&self) -> bool {
        self.numeric.iter().all(Option::is_some) && self.categorical.iter().all(Option::is_some)
    }

    pub fn missing_count(&self) -> usize {
        self.numeric.iter().filter(|v| v.is_none()).count()
            + self.categorical.iter().filter(|v| v.is_none()).count()
    }
}

impl From<&StudentRecord> for FeatureRow {
    fn from(record: &StudentRecord) -> Self {
        record.to_feature_row()
    }
}
