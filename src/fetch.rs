//! Blocking HTTP download for trip logs hosted remotely.

use anyhow::{Context, Result};
use tracing::debug;

/// Returns true when `source` should be fetched over HTTP rather than read from disk.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Downloads `url` and returns the response body.
///
/// # Errors
///
/// Returns an error if the request fails or the server answers with a
/// non-success status.
#[tracing::instrument(fields(source = %url))]
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let resp = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("fetching {url}"))?;
    let bytes = resp.bytes()?.to_vec();
    debug!(bytes = bytes.len(), "Trip log downloaded");
    Ok(bytes)
}
