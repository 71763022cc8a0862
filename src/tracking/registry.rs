// registry.rs - Tracker registry keyed by tracking URI scheme

use super::file_store::FileStoreTracker;
use super::rest::RestTracker;
use super::traits::Tracker;
use super::uri::TrackingUri;
use std::collections::HashMap;

/// Connection settings shared by all tracker constructors
#[derive(Debug, Clone, Default)]
pub struct TrackerOptions {
    /// Bearer token for tracking servers
    pub token: Option<String>,
}

type TrackerFactory = fn(&TrackingUri, &TrackerOptions) -> Result<Box<dyn Tracker>, String>;

fn open_file_store(uri: &TrackingUri, _options: &TrackerOptions) -> Result<Box<dyn Tracker>, String> {
    match uri {
        TrackingUri::File(path) => Ok(Box::new(FileStoreTracker::new(path)?)),
        other => Err(format!("'{}' is not a file store URI", other)),
    }
}

fn open_rest(uri: &TrackingUri, options: &TrackerOptions) -> Result<Box<dyn Tracker>, String> {
    match uri {
        TrackingUri::Http(url) => Ok(Box::new(RestTracker::new(url)?.with_token(options.token.clone()))),
        other => Err(format!("'{}' is not an HTTP tracking URI", other)),
    }
}

/// Registry for available tracking backends
pub struct TrackerRegistry {
    factories: HashMap<String, (TrackerFactory, &'static str)>,
}

impl TrackerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        // Register built-in backends
        registry.register("file", open_file_store, "Local MLflow file store (mlruns/ layout)");
        registry.register("http", open_rest, "MLflow tracking server over HTTP");
        registry.register("https", open_rest, "MLflow tracking server over HTTPS");

        registry
    }

    /// Register a backend for a URI scheme
    pub fn register(&mut self, scheme: &str, factory: TrackerFactory, description: &'static str) {
        self.factories.insert(scheme.to_string(), (factory, description));
    }

    pub fn has_scheme(&self, scheme: &str) -> bool {
        self.factories.contains_key(scheme)
    }

    /// List schemes with their descriptions, sorted by scheme
    pub fn list_backends(&self) -> Vec<(&str, &str)> {
        let mut backends: Vec<(&str, &str)> = self
            .factories
            .iter()
            .map(|(scheme, (_, desc))| (scheme.as_str(), *desc))
            .collect();
        backends.sort();
        backends
    }

    /// Build the tracker matching the URI's scheme
    pub fn open(&self, uri: &TrackingUri, options: &TrackerOptions) -> Result<Box<dyn Tracker>, String> {
        let (factory, _) = self.factories.get(uri.scheme()).ok_or_else(|| {
            let known: Vec<&str> = self.list_backends().into_iter().map(|(s, _)| s).collect();
            format!(
                "No tracker registered for scheme '{}'. Available: {}",
                uri.scheme(),
                known.join(", ")
            )
        })?;
        factory(uri, options)
    }
}

impl Default for TrackerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
