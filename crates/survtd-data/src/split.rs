use rand::{Rng, seq::index};

use crate::{DataError, SurvivalFrame};

/// Fraction of rows sampled into the test partition.
pub const TEST_FRACTION: f64 = 0.3;
/// Fraction of the remaining rows sampled into the validation partition.
pub const VAL_FRACTION: f64 = 0.1;

/// Train, validation and test partitions of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSplit {
    pub train: SurvivalFrame,
    pub val: SurvivalFrame,
    pub test: SurvivalFrame,
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn sample_size(len: usize, fraction: f64) -> usize {
    ((len as f64) * fraction).round() as usize
}

/// Splits `frame` into train, validation and test partitions.
///
/// The row with the largest duration is never sampled into the test
/// partition, so the training data always covers the full time range.
/// Test rows are a random [`TEST_FRACTION`] of the others; validation rows a
/// random [`VAL_FRACTION`] of what remains. Sampled partitions keep their
/// sampling order, the training partition keeps file order.
pub fn split<R>(frame: &SurvivalFrame, rng: &mut R) -> Result<DataSplit, DataError>
where
    R: Rng + ?Sized,
{
    let held_out = frame.argmax_duration().ok_or(DataError::Empty)?;
    let candidates = (0..frame.len()).filter(|&i| i != held_out).collect::<Vec<_>>();

    let n_test = sample_size(candidates.len(), TEST_FRACTION);
    let test_idx = index::sample(rng, candidates.len(), n_test)
        .into_iter()
        .map(|k| candidates[k])
        .collect::<Vec<_>>();

    let mut in_test = vec![false; frame.len()];
    for &i in &test_idx {
        in_test[i] = true;
    }
    let remaining = (0..frame.len()).filter(|&i| !in_test[i]).collect::<Vec<_>>();

    let n_val = sample_size(remaining.len(), VAL_FRACTION);
    let val_idx = index::sample(rng, remaining.len(), n_val)
        .into_iter()
        .map(|k| remaining[k])
        .collect::<Vec<_>>();

    let mut in_val = vec![false; frame.len()];
    for &i in &val_idx {
        in_val[i] = true;
    }
    let train_idx = remaining.into_iter().filter(|&i| !in_val[i]).collect::<Vec<_>>();

    log::info!(
        "split {} rows into train={} val={} test={}",
        frame.len(),
        train_idx.len(),
        val_idx.len(),
        test_idx.len()
    );
    Ok(DataSplit {
        train: frame.select(&train_idx),
        val: frame.select(&val_idx),
        test: frame.select(&test_idx),
    })
}
