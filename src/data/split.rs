// split.rs - Reproducible train/test split

use crate::data::Dataset;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Fraction of rows held out and the shuffle seed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitConfig {
    pub test_size: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.25,
            seed: 42,
        }
    }
}

/// Shuffle row indices and cut them into (train, test)
///
/// The test side takes `ceil(test_size * n)` rows, the train side the rest.
pub fn split_indices(n: usize, config: &SplitConfig) -> Result<(Vec<usize>, Vec<usize>), String> {
    if !(config.test_size > 0.0 && config.test_size < 1.0) {
        return Err(format!(
            "test_size must be between 0.0 and 1.0 (exclusive), got {}",
            config.test_size
        ));
    }

    let n_test = (config.test_size * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(format!(
            "Cannot split {} rows with test_size={}: both train and test sets must be non-empty",
            n, config.test_size
        ));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

/// Split a dataset into (train, test) halves
pub fn train_test_split(dataset: &Dataset, config: &SplitConfig) -> Result<(Dataset, Dataset), String> {
    let (train_idx, test_idx) = split_indices(dataset.n_rows(), config)?;
    Ok((dataset.subset(&train_idx), dataset.subset(&test_idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes_round_test_side_up() {
        let (train, test) = split_indices(10, &SplitConfig { test_size: 0.25, seed: 42 }).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);

        let (train, test) = split_indices(1599, &SplitConfig::default()).unwrap();
        assert_eq!(test.len(), 400);
        assert_eq!(train.len(), 1199);
    }

    #[test]
    fn test_split_is_deterministic_and_disjoint() {
        let config = SplitConfig { test_size: 0.3, seed: 7 };
        let first = split_indices(50, &config).unwrap();
        let second = split_indices(50, &config).unwrap();
        assert_eq!(first, second);

        let train: HashSet<usize> = first.0.iter().copied().collect();
        let test: HashSet<usize> = first.1.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 50);
    }

    #[test]
    fn test_split_differs_across_seeds() {
        let a = split_indices(100, &SplitConfig { test_size: 0.25, seed: 1 }).unwrap();
        let b = split_indices(100, &SplitConfig { test_size: 0.25, seed: 2 }).unwrap();
        assert_ne!(a.1, b.1);
    }

    #[test]
    fn test_split_rejects_degenerate_inputs() {
        assert!(split_indices(1, &SplitConfig::default()).is_err());
        assert!(split_indices(0, &SplitConfig::default()).is_err());
        assert!(split_indices(10, &SplitConfig { test_size: 1.0, seed: 0 }).is_err());
        assert!(split_indices(10, &SplitConfig { test_size: 0.0, seed: 0 }).is_err());
    }
}
