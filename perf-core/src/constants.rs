//! Central Configuration Constants
//!
//! Single source of truth for training and serving defaults.

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "model/performance_model.json";

/// Seed driving both the split and the forest
pub const DEFAULT_SEED: u64 = 42;

/// Default forest size
pub const DEFAULT_N_TREES: usize = 500;

/// Share of labelled rows held out for evaluation
pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Student Performance Predictor";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("PERF_MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get training seed from environment or use default
pub fn get_seed() -> u64 {
    std::env::var("PERF_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

/// Get forest size from environment or use default
pub fn get_n_trees() -> usize {
    std::env::var("PERF_N_TREES")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_N_TREES)
}
