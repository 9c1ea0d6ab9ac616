use crate::error::{MatchError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of one train/evaluation partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a fixed seed and hold out `ceil(n * test_size)` rows
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<Split> {
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(MatchError::Training(format!(
            "test fraction {} leaves no rows on one side of a {}-row split",
            test_size, n
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = indices.split_off(n_test);

    Ok(Split { train, test: indices })
}

/// `k` folds that each keep roughly the overall class balance.
///
/// Rows of each class are dealt to the folds round-robin, in index order.
pub fn stratified_k_fold(labels: &[u8], k: usize) -> Result<Vec<Split>> {
    if k < 2 || k > labels.len() {
        return Err(MatchError::Training(format!(
            "cannot build {} folds over {} rows",
            k,
            labels.len()
        )));
    }

    let mut fold_of = vec![0usize; labels.len()];
    for class in [0u8, 1u8] {
        labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label == class)
            .enumerate()
            .for_each(|(nth, (row, _))| fold_of[row] = nth % k);
    }

    Ok((0..k)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&row| fold_of[row] == fold);
            Split { train, test }
        })
        .collect())
}

pub fn select_rows(x: &Array2<f64>, rows: &[usize]) -> Array2<f64> {
    x.select(Axis(0), rows)
}

pub fn select_labels(y: &Array1<f64>, rows: &[usize]) -> Array1<f64> {
    y.select(Axis(0), rows)
}
