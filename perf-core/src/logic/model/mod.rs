//! Model Module - Classifier and inference engine
//!
//! The random forest is trained offline; the predictor wraps a fitted
//! preprocessor and a classifier head behind the `InferenceEngine` trait so
//! the server never sees the concrete model.

pub mod classifier;
pub mod forest;
pub mod inference;
pub mod tree;


pub use classifier::{Classifier, ClassifierHead, ProbabilisticClassifier};
pub use forest::{ClassWeight, ForestParams, MaxFeatures, RandomForest};
pub use inference::{
    ClassProbabilities, EngineStatus, InferenceEngine, InferenceError, PredictionResult, Predictor,
};
pub use tree::DecisionTree;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("training set is empty")]
    EmptyTrainingSet,
    #[error("{rows} rows but {labels} labels")]
    LabelCountMismatch { rows: usize, labels: usize },
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("expected {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("expected {expected} classes, got {actual}")]
    ClassCountMismatch { expected: usize, actual: usize },
    #[error("forest has no trees")]
    EmptyForest,
    #[error("tree is corrupt at node {0}")]
    CorruptTree(usize),
}
