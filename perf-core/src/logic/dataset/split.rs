//! Stratified train/test split.

use std::cmp::Reverse;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::label::PerformanceLevel;
use super::DatasetError;

/// Row indices of each side of the split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split `labels` into train/test preserving class proportions.
///
/// The test side gets `ceil(n * test_ratio)` rows; each class contributes in
/// proportion to its size, with leftover slots going to the classes with the
/// largest fractional share. Every present class needs at least two rows and
/// ends up with at least one row on each side.
pub fn stratified_split(
    labels: &[PerformanceLevel],
    test_ratio: f64,
    seed: u64,
) -> Result<SplitIndices, DatasetError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(DatasetError::InvalidTestRatio(test_ratio));
    }

    let n = labels.len();
    let mut by_class: Vec<(PerformanceLevel, Vec<usize>)> = PerformanceLevel::ALL
        .iter()
        .map(|&level| {
            let members: Vec<usize> = (0..n).filter(|&i| labels[i] == level).collect();
            (level, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect();

    for (level, members) in &by_class {
        if members.len() < 2 {
            return Err(DatasetError::ClassTooSmall {
                class: *level,
                count: members.len(),
            });
        }
    }

    let n_test = (n as f64 * test_ratio).ceil() as usize;
    let n_train = n - n_test;
    if n_test < by_class.len() || n_train < by_class.len() {
        return Err(DatasetError::SplitTooSmall {
            rows: n,
            classes: by_class.len(),
        });
    }

    // Largest-remainder allocation of test slots
    let exact: Vec<f64> = by_class
        .iter()
        .map(|(_, m)| m.len() as f64 * n_test as f64 / n as f64)
        .collect();
    let mut quota: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();
    let mut leftover = n_test - quota.iter().sum::<usize>();
    let mut order: Vec<usize> = (0..by_class.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for &c in order.iter().cycle() {
        if leftover == 0 {
            break;
        }
        if quota[c] < by_class[c].1.len() - 1 {
            quota[c] += 1;
            leftover -= 1;
        }
    }

    // Every class keeps at least one test row, taken from the largest quota
    for c in 0..quota.len() {
        if quota[c] > 0 {
            continue;
        }
        let donor = (0..quota.len())
            .filter(|&d| quota[d] > 1)
            .max_by_key(|&d| (quota[d], Reverse(d)))
            .ok_or(DatasetError::SplitTooSmall {
                rows: n,
                classes: by_class.len(),
            })?;
        quota[donor] -= 1;
        quota[c] = 1;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);

    for ((_, members), take) in by_class.iter_mut().zip(&quota) {
        members.shuffle(&mut rng);
        test.extend_from_slice(&members[..*take]);
        train.extend_from_slice(&members[*take..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    log::debug!("Stratified split: {} train / {} test rows", train.len(), test.len());

    Ok(SplitIndices { train, test })
}
