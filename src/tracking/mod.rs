// mod.rs - Experiment tracking module root

pub mod file_store;
pub mod registry;
pub mod rest;
pub mod traits;
pub mod uri;

// Re-export main types for convenience
pub use file_store::FileStoreTracker;
pub use registry::{TrackerOptions, TrackerRegistry};
pub use rest::{RestError, RestTracker};
pub use traits::{now_millis, validate_key, Metric, Param, RunInfo, RunStatus, RunTag, Tracker};
pub use uri::{TrackingUri, DEFAULT_TRACKING_URI};
