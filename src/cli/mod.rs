// mod.rs - CLI module

pub mod args;
pub mod config;
pub mod merge;
pub mod validation;

// Re-export main types for convenience
pub use args::{Args, DEFAULT_DATA_URL};
pub use config::Config;
pub use merge::{process_env, tracking_token};
pub use validation::{validate_args, ValidationResult};
