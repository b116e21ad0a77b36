//! Column transformer: numeric and categorical pipelines side by side.
//!
//! Output layout: one standardized column per numeric feature, followed by
//! each categorical feature's one-hot block, in feature layout order.

use ndarray::{Array1, Array2, ArrayViewMut1};
use serde::{Deserialize, Serialize};

use super::imputer::{median, most_frequent};
use super::onehot::OneHotEncoder;
use super::scaler::StandardScaler;
use super::PreprocessError;
use crate::logic::features::layout::{CATEGORICAL_FEATURES, NUMERIC_FEATURES};
use crate::logic::features::FeatureRow;

/// Median imputation followed by standardization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    pub fill: f64,
    pub scaler: StandardScaler,
}

/// Most-frequent imputation followed by one-hot encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub fill: String,
    pub encoder: OneHotEncoder,
}

/// Fitted preprocessing state; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPreprocessor {
    pub numeric: Vec<NumericColumn>,
    pub categorical: Vec<CategoricalColumn>,
}

impl FittedPreprocessor {
    /// Learn imputation, scaling and vocabulary from training rows only
    pub fn fit(rows: &[&FeatureRow]) -> Result<Self, PreprocessError> {
        if rows.is_empty() {
            return Err(PreprocessError::NoRows);
        }

        let mut numeric = Vec::with_capacity(NUMERIC_FEATURES.len());
        for (slot, name) in NUMERIC_FEATURES.iter().enumerate() {
            let column: Vec<Option<f64>> = rows.iter().map(|r| r.numeric[slot]).collect();
            let fill = median(column.iter().copied())
                .ok_or_else(|| PreprocessError::EmptyColumn(name.to_string()))?;

            let imputed: Vec<f64> = column
                .iter()
                .map(|v| v.filter(|x| !x.is_nan()).unwrap_or(fill))
                .collect();
            if let Some(bad) = imputed.iter().find(|v| !v.is_finite()) {
                return Err(PreprocessError::NonFinite {
                    column: name.to_string(),
                    value: *bad,
                });
            }

            numeric.push(NumericColumn {
                name: name.to_string(),
                fill,
                scaler: StandardScaler::fit(&imputed),
            });
        }

        let mut categorical = Vec::with_capacity(CATEGORICAL_FEATURES.len());
        for (slot, name) in CATEGORICAL_FEATURES.iter().enumerate() {
            let fill = most_frequent(rows.iter().map(|r| r.categorical[slot].as_deref()))
                .ok_or_else(|| PreprocessError::EmptyColumn(name.to_string()))?;

            let encoder = OneHotEncoder::fit(
                rows.iter()
                    .map(|r| r.categorical[slot].as_deref().unwrap_or(fill.as_str())),
            );

            categorical.push(CategoricalColumn {
                name: name.to_string(),
                fill,
                encoder,
            });
        }

        let fitted = Self { numeric, categorical };
        log::debug!("Preprocessor fitted: {} output columns", fitted.output_width());
        Ok(fitted)
    }

    /// Width of a transformed row
    pub fn output_width(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|c| c.encoder.width()).sum::<usize>()
    }

    /// Names of the transformed columns, e.g. `Age`, `Gender_Female`
    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numeric.iter().map(|c| c.name.clone()).collect();
        for column in &self.categorical {
            for category in &column.encoder.vocabulary {
                names.push(format!("{}_{}", column.name, category));
            }
        }
        names
    }

    /// Check the fitted state against the feature layout
    pub fn check_layout(&self) -> Result<(), PreprocessError> {
        let numeric_ok = self.numeric.iter().map(|c| c.name.as_str()).eq(NUMERIC_FEATURES.iter().copied());
        let categorical_ok = self
            .categorical
            .iter()
            .map(|c| c.name.as_str())
            .eq(CATEGORICAL_FEATURES.iter().copied());

        if numeric_ok && categorical_ok {
            Ok(())
        } else {
            Err(PreprocessError::SchemaMismatch {
                numeric: self.numeric.iter().map(|c| c.name.clone()).collect(),
                categorical: self.categorical.iter().map(|c| c.name.clone()).collect(),
            })
        }
    }

    fn transform_into(&self, row: &FeatureRow, mut out: ArrayViewMut1<f64>) -> Result<(), PreprocessError> {
        if row.numeric.len() != self.numeric.len() || row.categorical.len() != self.categorical.len() {
            return Err(PreprocessError::SchemaMismatch {
                numeric: self.numeric.iter().map(|c| c.name.clone()).collect(),
                categorical: self.categorical.iter().map(|c| c.name.clone()).collect(),
            });
        }

        for (i, (column, value)) in self.numeric.iter().zip(&row.numeric).enumerate() {
            let value = value.filter(|v| !v.is_nan()).unwrap_or(column.fill);
            if !value.is_finite() {
                return Err(PreprocessError::NonFinite {
                    column: column.name.clone(),
                    value,
                });
            }
            out[i] = column.scaler.transform(value);
        }

        let mut offset = self.numeric.len();
        for (column, value) in self.categorical.iter().zip(&row.categorical) {
            let value = value.as_deref().unwrap_or(column.fill.as_str());
            let width = column.encoder.width();
            let block = out
                .as_slice_mut()
                .ok_or(PreprocessError::NonContiguous)?;
            column.encoder.encode_into(value, &mut block[offset..offset + width]);
            offset += width;
        }

        Ok(())
    }

    /// Transform one row
    pub fn transform_row(&self, row: &FeatureRow) -> Result<Array1<f64>, PreprocessError> {
        let mut out = Array1::zeros(self.output_width());
        self.transform_into(row, out.view_mut())?;
        Ok(out)
    }

    /// Transform many rows into a `(rows, output_width)` matrix
    pub fn transform(&self, rows: &[&FeatureRow]) -> Result<Array2<f64>, PreprocessError> {
        let mut out = Array2::zeros((rows.len(), self.output_width()));
        for (row, target) in rows.iter().zip(out.rows_mut()) {
            self.transform_into(row, target)?;
        }
        Ok(out)
    }
}
