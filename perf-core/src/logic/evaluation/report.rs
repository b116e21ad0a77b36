//! Classification report over the fixed performance levels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::logic::dataset::PerformanceLevel;

const N_CLASSES: usize = PerformanceLevel::ALL.len();

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Test-split metrics; printed by the trainer, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Indexed by `PerformanceLevel::index`
    pub per_class: [ClassMetrics; N_CLASSES],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
    /// `confusion[actual][predicted]`
    pub confusion: [[usize; N_CLASSES]; N_CLASSES],
    /// Levels seen in the truth or the predictions; only these enter the macro average
    pub present: [bool; N_CLASSES],
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

impl ClassificationReport {
    /// Build from paired truth/prediction slices. Undefined ratios are 0.0.
    pub fn compute(actual: &[PerformanceLevel], predicted: &[PerformanceLevel]) -> Self {
        let mut confusion = [[0usize; N_CLASSES]; N_CLASSES];
        for (a, p) in actual.iter().zip(predicted) {
            confusion[a.index()][p.index()] += 1;
        }

        let total: usize = confusion.iter().flatten().sum();
        let correct: usize = (0..N_CLASSES).map(|i| confusion[i][i]).sum();

        let mut per_class = [ClassMetrics::default(); N_CLASSES];
        let mut present = [false; N_CLASSES];
        for (c, metrics) in per_class.iter_mut().enumerate() {
            let tp = confusion[c][c];
            let predicted_c: usize = (0..N_CLASSES).map(|a| confusion[a][c]).sum();
            let support: usize = confusion[c].iter().sum();
            present[c] = support > 0 || predicted_c > 0;
            let precision = ratio(tp, predicted_c);
            let recall = ratio(tp, support);
            *metrics = ClassMetrics {
                precision,
                recall,
                f1: f1(precision, recall),
                support,
            };
        }

        let n_present = present.iter().filter(|&&p| p).count();
        let mean = |get: fn(&ClassMetrics) -> f64| {
            if n_present == 0 {
                0.0
            } else {
                per_class
                    .iter()
                    .zip(&present)
                    .filter(|(_, p)| **p)
                    .map(|(m, _)| get(m))
                    .sum::<f64>()
                    / n_present as f64
            }
        };
        let weighted = |get: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                per_class.iter().map(|m| get(m) * m.support as f64).sum::<f64>() / total as f64
            }
        };

        let macro_avg = ClassMetrics {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            support: total,
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Self {
            per_class,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
            confusion,
            present,
        }
    }

    pub fn class(&self, level: PerformanceLevel) -> &ClassMetrics {
        &self.per_class[level.index()]
    }

    pub fn is_present(&self, level: PerformanceLevel) -> bool {
        self.present[level.index()]
    }

    pub fn total(&self) -> usize {
        self.macro_avg.support
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for level in PerformanceLevel::ALL.into_iter().filter(|&l| self.is_present(l)) {
            let m = self.class(level);
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                level.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>14} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, self.total())?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows: actual, columns: predicted)")?;
        write!(f, "{:>14}", "")?;
        for level in PerformanceLevel::ALL {
            write!(f, " {:>9}", level.as_str())?;
        }
        writeln!(f)?;
        for actual in PerformanceLevel::ALL {
            write!(f, "{:>14}", actual.as_str())?;
            for count in self.confusion[actual.index()] {
                write!(f, " {:>9}", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
