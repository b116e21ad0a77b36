//! Random forest: bagged CART trees with class-balanced weighting.

use std::collections::BTreeSet;

use ndarray::{ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, ProbabilisticClassifier};
use super::tree::{DecisionTree, TreeParams};
use super::ModelError;

/// How many features each split may examine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    Sqrt,
    All,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => *k,
        };
        n.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Every sample weighs 1
    Uniform,
    /// `n_samples / (n_classes * class_count)`
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_features: MaxFeatures,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_depth: Option<usize>,
    pub bootstrap: bool,
    pub class_weight: ClassWeight,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: crate::constants::DEFAULT_N_TREES,
            max_features: MaxFeatures::Sqrt,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_depth: None,
            bootstrap: true,
            class_weight: ClassWeight::Balanced,
            seed: crate::constants::DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Sorted class labels; tree distributions are indexed by this order
    pub classes: Vec<String>,
    pub class_weights: Vec<f64>,
    pub n_features: usize,
    pub params: ForestParams,
    pub trees: Vec<DecisionTree>,
}

/// Per-class weights for the given class indices
pub fn compute_class_weights(y: &[usize], n_classes: usize, mode: ClassWeight) -> Vec<f64> {
    match mode {
        ClassWeight::Uniform => vec![1.0; n_classes],
        ClassWeight::Balanced => {
            let mut counts = vec![0usize; n_classes];
            for &c in y {
                counts[c] += 1;
            }
            let n = y.len() as f64;
            counts
                .iter()
                .map(|&count| if count == 0 { 0.0 } else { n / (n_classes as f64 * count as f64) })
                .collect()
        }
    }
}

impl RandomForest {
    /// Fit on the rows of `x` labelled by `y`
    pub fn fit<S: AsRef<str>>(x: ArrayView2<f64>, y: &[S], params: ForestParams) -> Result<Self, ModelError> {
        let (n_rows, n_features) = x.dim();
        if n_rows == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if y.len() != n_rows {
            return Err(ModelError::LabelCountMismatch { rows: n_rows, labels: y.len() });
        }
        if params.n_trees == 0 {
            return Err(ModelError::InvalidParams("n_trees must be at least 1".to_string()));
        }

        let classes: Vec<String> = y
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let y_index: Vec<usize> = y
            .iter()
            .map(|s| classes.iter().position(|c| c == s.as_ref()).unwrap_or_default())
            .collect();
        let n_classes = classes.len();
        let class_weights = compute_class_weights(&y_index, n_classes, params.class_weight);

        let tree_params = TreeParams {
            max_features: params.max_features.resolve(n_features),
            min_samples_split: params.min_samples_split.max(2),
            min_samples_leaf: params.min_samples_leaf.max(1),
            max_depth: params.max_depth,
        };

        log::info!(
            "Training forest: {} trees, {} rows, {} features ({} per split), classes {:?}",
            params.n_trees, n_rows, n_features, tree_params.max_features, classes
        );

        let mut master = ChaCha8Rng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        let mut weights = vec![0.0; n_rows];

        for t in 0..params.n_trees {
            let mut rng = ChaCha8Rng::seed_from_u64(master.gen::<u64>());

            if params.bootstrap {
                weights.iter_mut().for_each(|w| *w = 0.0);
                for _ in 0..n_rows {
                    weights[rng.gen_range(0..n_rows)] += 1.0;
                }
            } else {
                weights.iter_mut().for_each(|w| *w = 1.0);
            }
            for (w, &c) in weights.iter_mut().zip(&y_index) {
                *w *= class_weights[c];
            }

            trees.push(DecisionTree::fit(x, &y_index, &weights, n_classes, &tree_params, &mut rng)?);

            if (t + 1) % 100 == 0 {
                log::debug!("Grown {}/{} trees", t + 1, params.n_trees);
            }
        }

        Ok(Self {
            classes,
            class_weights,
            n_features,
            params,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean of the per-tree leaf distributions
    pub fn predict_proba_row(&self, x: ArrayView1<f64>) -> Result<Vec<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }

        let mut sum = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let dist = tree.predict_proba_row(x)?;
            if dist.len() != sum.len() {
                return Err(ModelError::ClassCountMismatch {
                    expected: sum.len(),
                    actual: dist.len(),
                });
            }
            for (s, p) in sum.iter_mut().zip(dist) {
                *s += p;
            }
        }

        let n = self.trees.len() as f64;
        Ok(sum.into_iter().map(|s| s / n).collect())
    }

    /// Index of the most probable class; ties go to the lower index
    pub fn predict_index(&self, x: ArrayView1<f64>) -> Result<usize, ModelError> {
        let proba = self.predict_proba_row(x)?;
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        Ok(best)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }
        for tree in &self.trees {
            if tree.n_features != self.n_features {
                return Err(ModelError::FeatureCountMismatch {
                    expected: self.n_features,
                    actual: tree.n_features,
                });
            }
            if tree.n_classes != self.classes.len() {
                return Err(ModelError::ClassCountMismatch {
                    expected: self.classes.len(),
                    actual: tree.n_classes,
                });
            }
            tree.validate()?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, x: ArrayView1<f64>) -> Result<String, ModelError> {
        let index = self.predict_index(x)?;
        Ok(self.classes[index].clone())
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn predict_proba(&self, x: ArrayView1<f64>) -> Result<Vec<f64>, ModelError> {
        self.predict_proba_row(x)
    }
}
