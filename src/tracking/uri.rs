// uri.rs - Tracking URI parsing

use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Default local store when no tracking URI is configured
pub const DEFAULT_TRACKING_URI: &str = "./mlruns";

/// Parsed tracking destination
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingUri {
    /// Local MLflow file store rooted at a directory
    File(PathBuf),
    /// MLflow tracking server base URL, without trailing slash
    Http(String),
}

impl TrackingUri {
    /// Parse `file:` URIs, bare paths, and http(s) URLs
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("Tracking URI must not be empty".to_string());
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let base = trimmed.trim_end_matches('/');
            let authority = base.splitn(2, "://").nth(1).unwrap_or("");
            if authority.is_empty() {
                return Err(format!("Tracking URI '{}' has no host", raw));
            }
            return Ok(TrackingUri::Http(base.to_string()));
        }

        if let Some(rest) = trimmed.strip_prefix("file:") {
            // file:///abs, file://localhost/abs, file:relative
            let path = if let Some(after) = rest.strip_prefix("//") {
                match after.find('/') {
                    Some(0) => after,
                    Some(idx) => &after[idx..],
                    None => return Err(format!("Tracking URI '{}' has no path", raw)),
                }
            } else {
                rest
            };
            if path.is_empty() {
                return Err(format!("Tracking URI '{}' has no path", raw));
            }
            return Ok(TrackingUri::File(PathBuf::from(path)));
        }

        // A scheme is letters followed by "://" or a single ':' not part of a Windows drive letter
        if let Some(idx) = trimmed.find(':') {
            let scheme = &trimmed[..idx];
            let is_drive = scheme.len() == 1;
            if !is_drive && !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+') {
                return Err(format!(
                    "Unsupported tracking URI scheme '{}'. Use a local path, file:, http:// or https://",
                    scheme
                ));
            }
        }

        Ok(TrackingUri::File(PathBuf::from(trimmed)))
    }

    /// Scheme used to pick a tracker implementation
    pub fn scheme(&self) -> &'static str {
        match self {
            TrackingUri::File(_) => "file",
            TrackingUri::Http(url) if url.to_ascii_lowercase().starts_with("https://") => "https",
            TrackingUri::Http(_) => "http",
        }
    }
}

impl Display for TrackingUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackingUri::File(path) => write!(f, "file:{}", path.display()),
            TrackingUri::Http(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http() {
        let uri = TrackingUri::parse("http://tracking.example.com:5000/").unwrap();
        assert_eq!(uri, TrackingUri::Http("http://tracking.example.com:5000".to_string()));
        assert_eq!(uri.scheme(), "http");
        assert_eq!(TrackingUri::parse("https://mlflow.local").unwrap().scheme(), "https");
        assert!(TrackingUri::parse("http://").is_err());
    }

    #[test]
    fn test_parse_file_forms() {
        assert_eq!(
            TrackingUri::parse("file:///tmp/mlruns").unwrap(),
            TrackingUri::File(PathBuf::from("/tmp/mlruns"))
        );
        assert_eq!(
            TrackingUri::parse("file://localhost/tmp/mlruns").unwrap(),
            TrackingUri::File(PathBuf::from("/tmp/mlruns"))
        );
        assert_eq!(
            TrackingUri::parse("file:mlruns").unwrap(),
            TrackingUri::File(PathBuf::from("mlruns"))
        );
        assert_eq!(
            TrackingUri::parse(DEFAULT_TRACKING_URI).unwrap(),
            TrackingUri::File(PathBuf::from("./mlruns"))
        );
        assert_eq!(TrackingUri::parse("./mlruns").unwrap().scheme(), "file");
    }

    #[test]
    fn test_parse_rejects_unknown_schemes() {
        assert!(TrackingUri::parse("databricks://profile").is_err());
        assert!(TrackingUri::parse("sqlite:///mlflow.db").is_err());
        assert!(TrackingUri::parse("").is_err());
    }
}
