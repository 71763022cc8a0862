// remote.rs - HTTP download of dataset files

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Download a dataset over HTTP(S), failing on non-2xx responses
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?,
    );
    spinner.set_message(format!("Downloading {}", url));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = download(url);
    spinner.finish_and_clear();
    result
}

fn download(url: &str) -> Result<Vec<u8>, String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("wine-enet/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| format!("Request to '{}' failed: {}", url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("Download of '{}' failed with HTTP {}", url, status));
    }

    let bytes = response
        .bytes()
        .map_err(|e| format!("Failed to read response body from '{}': {}", url, e))?;
    Ok(bytes.to_vec())
}
