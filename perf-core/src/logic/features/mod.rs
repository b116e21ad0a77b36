//! Features Module - Feature schema shared by training and serving
//!
//! The layout fixes column order and version; the record types carry one
//! student's raw values into the transform.

pub mod layout;
pub mod record;

#[cfg(test)]
mod tests;

pub use layout::{
    LayoutInfo, LayoutMismatchError, CATEGORICAL_COUNT, CATEGORICAL_FEATURES, DEPARTMENT_VALUES,
    FEATURE_COUNT, FEATURE_VERSION, GENDER_VALUES, NUMERIC_COUNT, NUMERIC_FEATURES,
};
pub use record::{FeatureRow, StudentRecord};
