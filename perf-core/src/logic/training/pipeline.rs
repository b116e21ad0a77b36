use std::str::FromStr;

use crate::logic::artifact::{save_artifact, PipelineArtifact, TrainingSummary};
use crate::logic::dataset::{label_rows, read_csv, stratified_split, LabeledDataset, PerformanceLevel};
use crate::logic::evaluation::ClassificationReport;
use crate::logic::features::FeatureRow;
use crate::logic::model::{Classifier, RandomForest};
use crate::logic::preprocess::FittedPreprocessor;

use super::config::TrainingConfig;
use super::PipelineError;

/// Fitted artifact plus its held-out evaluation
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: PipelineArtifact,
    pub report: ClassificationReport,
}

fn select_features<'a>(dataset: &'a LabeledDataset, indices: &[usize]) -> Vec<&'a FeatureRow> {
    indices.iter().map(|&i| &dataset.rows[i].features).collect()
}

/// Split, fit the transform and forest on the training side, evaluate on the test side
pub fn fit_pipeline(dataset: &LabeledDataset, config: &TrainingConfig) -> Result<TrainingOutcome, PipelineError> {
    let labels = dataset.labels();
    let split = stratified_split(&labels, config.test_ratio, config.seed())?;
    log::info!(
        "Stratified split (seed {}): {} train / {} test",
        config.seed(),
        split.train.len(),
        split.test.len()
    );

    let train_rows = select_features(dataset, &split.train);
    let test_rows = select_features(dataset, &split.test);

    let preprocessor = FittedPreprocessor::fit(&train_rows)?;
    log::debug!("Transformed columns: {:?}", preprocessor.output_names());

    let x_train = preprocessor.transform(&train_rows)?;
    let y_train: Vec<&str> = split.train.iter().map(|&i| labels[i].as_str()).collect();
    let forest = RandomForest::fit(x_train.view(), &y_train, config.forest)?;

    let x_test = preprocessor.transform(&test_rows)?;
    let actual: Vec<PerformanceLevel> = split.test.iter().map(|&i| labels[i]).collect();
    let mut predicted = Vec::with_capacity(actual.len());
    for row in x_test.rows() {
        predicted.push(PerformanceLevel::from_str(&forest.predict(row)?)?);
    }
    let report = ClassificationReport::compute(&actual, &predicted);
    log::info!("Test accuracy: {:.4}", report.accuracy);

    let training = TrainingSummary {
        seed: config.seed(),
        n_trees: forest.n_trees(),
        test_ratio: config.test_ratio,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        class_counts: dataset.class_counts(),
        skipped_rows: dataset.skipped,
    };
    let artifact = PipelineArtifact::new(config.bins.clone(), training, preprocessor, forest);

    Ok(TrainingOutcome { artifact, report })
}

/// Read, label, fit, evaluate and persist. Nothing is written on failure.
pub fn run(config: &TrainingConfig) -> Result<TrainingOutcome, PipelineError> {
    let rows = read_csv(&config.dataset)?;
    log::info!("Read {} rows", rows.len());

    let dataset = label_rows(rows, &config.bins, config.out_of_range)?;
    let outcome = fit_pipeline(&dataset, config)?;

    save_artifact(&outcome.artifact, &config.output)?;
    Ok(outcome)
}
