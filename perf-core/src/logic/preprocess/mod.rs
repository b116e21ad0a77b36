//! Preprocess Module - Deterministic feature transform
//!
//! Fitted once on the training split and applied unchanged to the test split
//! and to every inference request.

pub mod imputer;
pub mod onehot;
pub mod scaler;
pub mod transformer;


pub use onehot::OneHotEncoder;
pub use scaler::StandardScaler;
pub use transformer::{CategoricalColumn, FittedPreprocessor, NumericColumn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreprocessError {
    #[error("cannot fit a preprocessor on zero rows")]
    NoRows,
    #[error("column {0} has no values to impute from")]
    EmptyColumn(String),
    #[error("column {column} has non-finite value {value}")]
    NonFinite { column: String, value: f64 },
    #[error("fitted columns {numeric:?} + {categorical:?} do not match the feature layout")]
    SchemaMismatch {
        numeric: Vec<String>,
        categorical: Vec<String>,
    },
    #[error("output buffer is not contiguous")]
    NonContiguous,
}
