//! Classifier traits and the capability-tagged head used by the predictor.

use ndarray::ArrayView1;

use super::ModelError;

/// Anything that maps a transformed row to one of its class labels
pub trait Classifier: Send + Sync {
    /// Labels the classifier was trained on
    fn classes(&self) -> &[String];

    /// Expected width of a transformed row
    fn n_features(&self) -> usize;

    fn predict(&self, x: ArrayView1<f64>) -> Result<String, ModelError>;
}

/// Classifier that can also estimate per-class probabilities.
///
/// `predict_proba` returns one value per entry of `classes()`, same order.
pub trait ProbabilisticClassifier: Classifier {
    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Vec<f64>, ModelError>;
}

/// Classifier plus the capability it was registered with.
///
/// Chosen once when the predictor is built, so requests never probe.
pub enum ClassifierHead {
    Probabilistic(Box<dyn ProbabilisticClassifier>),
    LabelOnly(Box<dyn Classifier>),
}

impl ClassifierHead {
    pub fn supports_probabilities(&self) -> bool {
        matches!(self, ClassifierHead::Probabilistic(_))
    }

    pub fn classes(&self) -> &[String] {
        match self {
            ClassifierHead::Probabilistic(c) => c.classes(),
            ClassifierHead::LabelOnly(c) => c.classes(),
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            ClassifierHead::Probabilistic(c) => c.n_features(),
            ClassifierHead::LabelOnly(c) => c.n_features(),
        }
    }
}

impl std::fmt::Debug for ClassifierHead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            ClassifierHead::Probabilistic(_) => "Probabilistic",
            ClassifierHead::LabelOnly(_) => "LabelOnly",
        };
        f.debug_struct("ClassifierHead")
            .field("kind", &kind)
            .field("classes", &self.classes())
            .finish()
    }
}
