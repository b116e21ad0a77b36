//! Fixed-vocabulary one-hot encoding.

use serde::{Deserialize, Serialize};

/// Categories seen during fitting, sorted; anything else encodes as all zeros
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub vocabulary: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut vocabulary: Vec<String> = values.into_iter().map(str::to_string).collect();
        vocabulary.sort();
        vocabulary.dedup();
        Self { vocabulary }
    }

    pub fn width(&self) -> usize {
        self.vocabulary.len()
    }

    /// Position of `value` in the vocabulary
    pub fn position(&self, value: &str) -> Option<usize> {
        self.vocabulary
            .binary_search_by(|probe| probe.as_str().cmp(value))
            .ok()
    }

    /// Write the indicator block for `value` into `out` (len == width)
    pub fn encode_into(&self, value: &str, out: &mut [f64]) {
        out.fill(0.0);
        match self.position(value) {
            Some(i) => out[i] = 1.0,
            None => log::debug!("Unseen category '{}' encoded as all zeros", value),
        }
    }
}
