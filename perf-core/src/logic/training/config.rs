use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::dataset::{CgpaBins, OutOfRangePolicy};
use crate::logic::model::ForestParams;

/// Everything one training run needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub dataset: PathBuf,
    pub output: PathBuf,
    pub test_ratio: f64,
    pub bins: CgpaBins,
    pub out_of_range: OutOfRangePolicy,
    pub forest: ForestParams,
}

impl TrainingConfig {
    /// Defaults from `constants`, with env overrides for output, seed and forest size
    pub fn new(dataset: impl Into<PathBuf>) -> Self {
        Self {
            dataset: dataset.into(),
            output: PathBuf::from(constants::get_model_path()),
            test_ratio: constants::DEFAULT_TEST_RATIO,
            bins: CgpaBins::default(),
            out_of_range: OutOfRangePolicy::default(),
            forest: ForestParams {
                n_trees: constants::get_n_trees(),
                seed: constants::get_seed(),
                ..ForestParams::default()
            },
        }
    }

    pub fn seed(&self) -> u64 {
        self.forest.seed
    }
}
