//! Inference Engine - Applies a fitted pipeline to one student record
//!
//! `Predictor` is built once from a loaded artifact (or from parts in tests)
//! and shared read-only behind `Arc<dyn InferenceEngine>`.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::classifier::ClassifierHead;
use super::ModelError;
use crate::logic::artifact::PipelineArtifact;
use crate::logic::dataset::PerformanceLevel;
use crate::logic::features::layout::FEATURE_VERSION;
use crate::logic::features::StudentRecord;
use crate::logic::preprocess::{FittedPreprocessor, PreprocessError};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Probability per performance level; every key is always present
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassProbabilities {
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Medium")]
    pub medium: f64,
    #[serde(rename = "High")]
    pub high: f64,
}

impl ClassProbabilities {
    /// Re-key classifier output onto the fixed label set.
    ///
    /// Classes outside {Low, Medium, High} are dropped; levels the
    /// classifier doesn't know stay at 0.0.
    pub fn from_classes(classes: &[String], proba: &[f64]) -> Self {
        let by_name: HashMap<&str, f64> = classes.iter().map(String::as_str).zip(proba.iter().copied()).collect();
        let get = |level: PerformanceLevel| by_name.get(level.as_str()).copied().unwrap_or(0.0);
        Self {
            low: get(PerformanceLevel::Low),
            medium: get(PerformanceLevel::Medium),
            high: get(PerformanceLevel::High),
        }
    }

    pub fn get(&self, level: PerformanceLevel) -> f64 {
        match level {
            PerformanceLevel::Low => self.low,
            PerformanceLevel::Medium => self.medium,
            PerformanceLevel::High => self.high,
        }
    }

    pub fn sum(&self) -> f64 {
        self.low + self.medium + self.high
    }
}

/// Prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: PerformanceLevel,
    /// `None` when the classifier can't estimate probabilities
    pub probabilities: Option<ClassProbabilities>,
}

/// Engine Status for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub artifact_id: Option<String>,
    pub feature_version: u8,
    pub n_trees: usize,
    pub classes: Vec<String>,
    pub probabilistic: bool,
    pub inference_count: u64,
    pub avg_latency_ms: f64,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("transform failed: {0}")]
    Transform(#[from] PreprocessError),
    #[error("classifier failed: {0}")]
    Model(#[from] ModelError),
    #[error("classifier returned unknown label '{0}'")]
    UnknownLabel(String),
    #[error("classifier returned {actual} probabilities for {expected} classes")]
    ProbabilityShape { expected: usize, actual: usize },
    #[error("classifier expects {expected} inputs but the preprocessor produces {actual}")]
    WidthMismatch { expected: usize, actual: usize },
}

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// Anything the server can ask for a prediction
pub trait InferenceEngine: Send + Sync {
    fn predict(&self, record: &StudentRecord) -> Result<PredictionResult, InferenceError>;
    fn status(&self) -> EngineStatus;
}

// ============================================================================
// PREDICTOR
// ============================================================================

/// Fitted preprocessor plus classifier head
#[derive(Debug)]
pub struct Predictor {
    preprocessor: FittedPreprocessor,
    head: ClassifierHead,
    artifact_id: Option<String>,
    n_trees: usize,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl Predictor {
    pub fn new(preprocessor: FittedPreprocessor, head: ClassifierHead) -> Result<Self, InferenceError> {
        let width = preprocessor.output_width();
        if head.n_features() != width {
            return Err(InferenceError::WidthMismatch {
                expected: head.n_features(),
                actual: width,
            });
        }

        Ok(Self {
            preprocessor,
            head,
            artifact_id: None,
            n_trees: 0,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
        })
    }

    /// The forest always estimates probabilities
    pub fn from_artifact(artifact: PipelineArtifact) -> Result<Self, InferenceError> {
        let n_trees = artifact.forest.n_trees();
        let mut predictor = Self::new(
            artifact.preprocessor,
            ClassifierHead::Probabilistic(Box::new(artifact.forest)),
        )?;
        predictor.artifact_id = Some(artifact.id);
        predictor.n_trees = n_trees;
        Ok(predictor)
    }

    pub fn head(&self) -> &ClassifierHead {
        &self.head
    }

    fn predict_inner(&self, record: &StudentRecord) -> Result<PredictionResult, InferenceError> {
        let x = self.preprocessor.transform_row(&record.to_feature_row())?;

        let (label, probabilities) = match &self.head {
            ClassifierHead::Probabilistic(classifier) => {
                let proba = classifier.predict_proba(x.view())?;
                let classes = classifier.classes();
                if proba.is_empty() || proba.len() != classes.len() {
                    return Err(InferenceError::ProbabilityShape {
                        expected: classes.len(),
                        actual: proba.len(),
                    });
                }
                // First maximum in class order, same as the forest's own vote
                let mut best = 0;
                for (i, p) in proba.iter().enumerate() {
                    if *p > proba[best] {
                        best = i;
                    }
                }
                (
                    classes[best].clone(),
                    Some(ClassProbabilities::from_classes(classes, &proba)),
                )
            }
            ClassifierHead::LabelOnly(classifier) => (classifier.predict(x.view())?, None),
        };
        let label = PerformanceLevel::from_str(&label).map_err(|e| InferenceError::UnknownLabel(e.0))?;

        Ok(PredictionResult { label, probabilities })
    }
}

impl InferenceEngine for Predictor {
    fn predict(&self, record: &StudentRecord) -> Result<PredictionResult, InferenceError> {
        let start = Instant::now();
        let result = self.predict_inner(record);

        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        result
    }

    fn status(&self) -> EngineStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f64 / count as f64) / 1000.0 } else { 0.0 };

        EngineStatus {
            artifact_id: self.artifact_id.clone(),
            feature_version: FEATURE_VERSION,
            n_trees: self.n_trees,
            classes: self.head.classes().to_vec(),
            probabilistic: self.head.supports_probabilities(),
            inference_count: count,
            avg_latency_ms: avg,
        }
    }
}
