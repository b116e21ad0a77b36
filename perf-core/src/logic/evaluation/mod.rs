//! Evaluation Module - Held-out metrics for a trained pipeline

pub mod report;


pub use report::{ClassMetrics, ClassificationReport};
