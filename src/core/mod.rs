// mod.rs - Core logic module

pub mod elastic_net;
pub mod metrics;
pub mod signature;

// Re-export main types for convenience
pub use elastic_net::{ElasticNetModel, ElasticNetParams};
pub use metrics::{eval_metrics, EvalMetrics};
pub use signature::ModelSignature;
