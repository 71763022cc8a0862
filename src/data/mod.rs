// mod.rs - Data structures module

pub mod dataset;
pub mod loaders;
pub mod split;

// Re-export main types for convenience
pub use dataset::{Dataset, FeatureMatrix};
pub use loaders::DataSource;
pub use split::{split_indices, train_test_split, SplitConfig};
