//! Logic Module - Training pipeline and inference engines
//!
//! ## Architecture
//! - `features/` - Feature layout (single source of truth) and student record
//! - `dataset/` - CSV ingestion, CGPA labelling, stratified split
//! - `preprocess/` - Imputation, scaling, one-hot encoding
//! - `model/` - Decision tree, random forest, predictor
//! - `evaluation/` - Classification report
//! - `artifact/` - Versioned, checksummed pipeline artifact
//! - `training/` - Offline pipeline orchestration

pub mod artifact;
pub mod dataset;
pub mod evaluation;
pub mod features;
pub mod model;
pub mod preprocess;
pub mod training;
