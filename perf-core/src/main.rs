//! perf-train - Offline training entry point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use perf_core::constants;
use perf_core::logic::dataset::OutOfRangePolicy;
use perf_core::logic::training::{self, TrainingConfig};

/// Train the student performance classifier and persist the pipeline artifact
#[derive(Parser, Debug)]
#[command(name = "perf-train", author, version, about, long_about = None)]
struct Cli {
    /// CSV dataset with the student features, CGPA and an optional Student_ID
    dataset: PathBuf,

    /// Where to write the artifact
    #[arg(short, long, env = "PERF_MODEL_PATH", default_value = constants::DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Seed for the split and the forest
    #[arg(long, env = "PERF_SEED", default_value_t = constants::DEFAULT_SEED)]
    seed: u64,

    /// Number of trees in the forest
    #[arg(long, env = "PERF_N_TREES", default_value_t = constants::DEFAULT_N_TREES)]
    trees: usize,

    /// Share of rows held out for evaluation
    #[arg(long, default_value_t = constants::DEFAULT_TEST_RATIO)]
    test_ratio: f64,

    /// Drop rows whose CGPA falls outside the bins instead of aborting
    #[arg(long)]
    skip_unlabeled: bool,
}

impl Cli {
    fn into_config(self) -> TrainingConfig {
        let mut config = TrainingConfig::new(self.dataset);
        config.output = self.output;
        config.test_ratio = self.test_ratio;
        config.forest.seed = self.seed;
        config.forest.n_trees = self.trees;
        if self.skip_unlabeled {
            config.out_of_range = OutOfRangePolicy::Skip;
        }
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Starting {} trainer v{}", constants::APP_NAME, constants::APP_VERSION);

    let config = cli.into_config();
    let outcome = training::run(&config)
        .with_context(|| format!("training on {} failed", config.dataset.display()))?;

    println!("{}", outcome.report);
    println!(
        "Saved artifact {} ({} trees, {} train / {} test rows) to {}",
        outcome.artifact.id,
        outcome.artifact.training.n_trees,
        outcome.artifact.training.train_rows,
        outcome.artifact.training.test_rows,
        config.output.display()
    );
    Ok(())
}
