//! CART decision tree (Gini impurity, weighted samples).
//!
//! Nodes live in a flat vector; a split sends `x[feature] <= threshold` to
//! `left`. Leaves hold the normalized weighted class distribution of the
//! training samples that reached them.

use ndarray::{ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ModelError;

/// Impurity decreases at or below this are not worth a split
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Candidate features examined per split
    pub max_features: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
    pub n_features: usize,
    pub n_classes: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

/// Pending node: its slot, the samples that reached it, and its depth
struct Frame {
    slot: usize,
    samples: Vec<usize>,
    depth: usize,
}

fn gini(class_weights: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - class_weights.iter().map(|w| (w / total).powi(2)).sum::<f64>()
}

fn class_weights(samples: &[usize], y: &[usize], weights: &[f64], n_classes: usize) -> Vec<f64> {
    let mut out = vec![0.0; n_classes];
    for &s in samples {
        out[y[s]] += weights[s];
    }
    out
}

fn leaf(class_weights: Vec<f64>) -> Node {
    let total: f64 = class_weights.iter().sum();
    let distribution = if total > 0.0 {
        class_weights.iter().map(|w| w / total).collect()
    } else {
        let n = class_weights.len().max(1) as f64;
        vec![1.0 / n; class_weights.len()]
    };
    Node::Leaf { distribution }
}

impl DecisionTree {
    /// Grow a tree over the rows of `x` whose weight is positive.
    ///
    /// `y[i]` is a class index below `n_classes`; `weights[i]` combines
    /// bootstrap multiplicity and class weight.
    pub fn fit<R: Rng + ?Sized>(
        x: ArrayView2<f64>,
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        let (n_rows, n_features) = x.dim();
        if y.len() != n_rows || weights.len() != n_rows {
            return Err(ModelError::LabelCountMismatch {
                rows: n_rows,
                labels: y.len().min(weights.len()),
            });
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(ModelError::InvalidParams(format!(
                "class index {} out of range for {} classes",
                bad, n_classes
            )));
        }

        let samples: Vec<usize> = (0..n_rows).filter(|&i| weights[i] > 0.0).collect();
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let mut tree = DecisionTree {
            nodes: vec![Node::Leaf { distribution: Vec::new() }],
            n_features,
            n_classes,
        };
        let mut feature_order: Vec<usize> = (0..n_features).collect();
        let mut stack = vec![Frame { slot: 0, samples, depth: 0 }];

        while let Some(frame) = stack.pop() {
            let node_weights = class_weights(&frame.samples, y, weights, n_classes);
            let total: f64 = node_weights.iter().sum();
            let pure = node_weights.iter().filter(|&&w| w > 0.0).count() <= 1;
            let depth_reached = params.max_depth.map_or(false, |d| frame.depth >= d);

            if pure || depth_reached || frame.samples.len() < params.min_samples_split {
                tree.nodes[frame.slot] = leaf(node_weights);
                continue;
            }

            feature_order.shuffle(rng);
            let parent_impurity = gini(&node_weights, total);
            let best = find_best_split(
                x,
                y,
                weights,
                &frame.samples,
                &feature_order,
                &node_weights,
                parent_impurity * total,
                params,
            );

            let Some(best) = best else {
                tree.nodes[frame.slot] = leaf(node_weights);
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = frame
                .samples
                .iter()
                .copied()
                .partition(|&s| x[[s, best.feature]] <= best.threshold);

            let left = tree.nodes.len();
            let right = left + 1;
            tree.nodes.push(Node::Leaf { distribution: Vec::new() });
            tree.nodes.push(Node::Leaf { distribution: Vec::new() });
            tree.nodes[frame.slot] = Node::Split {
                feature: best.feature,
                threshold: best.threshold,
                left,
                right,
            };

            stack.push(Frame { slot: right, samples: right_samples, depth: frame.depth + 1 });
            stack.push(Frame { slot: left, samples: left_samples, depth: frame.depth + 1 });
        }

        Ok(tree)
    }

    /// Class distribution of the leaf `x` falls into
    pub fn predict_proba_row(&self, x: ArrayView1<f64>) -> Result<&[f64], ModelError> {
        if x.len() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: x.len(),
            });
        }

        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { distribution }) => return Ok(distribution.as_slice()),
                Some(Node::Split { feature, threshold, left, right }) => {
                    let value = x.get(*feature).copied().ok_or(ModelError::CorruptTree(index))?;
                    index = if value <= *threshold { *left } else { *right };
                }
                None => return Err(ModelError::CorruptTree(index)),
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    /// Structural sanity check for trees read back from disk
    pub fn validate(&self) -> Result<(), ModelError> {
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split { feature, left, right, threshold } => {
                    let children_ok = *left > index && *right > index
                        && *left < self.nodes.len() && *right < self.nodes.len();
                    if *feature >= self.n_features || !children_ok || threshold.is_nan() {
                        return Err(ModelError::CorruptTree(index));
                    }
                }
                Node::Leaf { distribution } => {
                    if distribution.len() != self.n_classes {
                        return Err(ModelError::CorruptTree(index));
                    }
                }
            }
        }
        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
fn find_best_split(
    x: ArrayView2<f64>,
    y: &[usize],
    weights: &[f64],
    samples: &[usize],
    feature_order: &[usize],
    node_weights: &[f64],
    weighted_parent_impurity: f64,
    params: &TreeParams,
) -> Option<BestSplit> {
    let total: f64 = node_weights.iter().sum();
    let n_classes = node_weights.len();
    let mut best: Option<BestSplit> = None;
    let mut visited = 0;
    let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(samples.len());

    for &feature in feature_order {
        if visited >= params.max_features {
            break;
        }

        sorted.clear();
        sorted.extend(samples.iter().map(|&s| (x[[s, feature]], s)));
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Constant features don't count towards max_features
        if sorted[0].0 == sorted[sorted.len() - 1].0 {
            continue;
        }
        visited += 1;

        let mut left = vec![0.0; n_classes];
        let mut left_total = 0.0;

        for i in 0..sorted.len() - 1 {
            let (value, s) = sorted[i];
            left[y[s]] += weights[s];
            left_total += weights[s];

            let next = sorted[i + 1].0;
            if next <= value {
                continue;
            }
            let left_count = i + 1;
            let right_count = sorted.len() - left_count;
            if left_count < params.min_samples_leaf || right_count < params.min_samples_leaf {
                continue;
            }

            let right: Vec<f64> = node_weights.iter().zip(&left).map(|(n, l)| n - l).collect();
            let right_total = total - left_total;
            let children = left_total * gini(&left, left_total) + right_total * gini(&right, right_total);
            let decrease = weighted_parent_impurity - children;

            if decrease > MIN_IMPURITY_DECREASE && best.as_ref().map_or(true, |b| decrease > b.decrease) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(BestSplit { feature, threshold, decrease });
            }
        }
    }

    best
}
