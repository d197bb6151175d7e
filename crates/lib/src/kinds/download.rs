//! Download a file from a URL.
//!
//! The job is skipped when the destination already exists, unless forced.
//! The downloaded file is not an output unless declared as one.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use crate::job::{Job, JobContext, JobError, JobFlags};

#[derive(Debug, Clone)]
pub struct DownloadJob {
  url: String,
  download_path: PathBuf,
  sha256: Option<String>,
  force: bool,
}

impl DownloadJob {
  /// Download `url` into the directory `dir`, named after the URL's last path segment.
  pub fn into_dir(url: impl Into<String>, dir: impl AsRef<Path>) -> Self {
    let url = url.into();
    let download_path = dir.as_ref().join(url_to_filename(&url));
    Self::to_path(url, download_path)
  }

  /// Download `url` to exactly `path`.
  pub fn to_path(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      url: url.into(),
      download_path: path.into(),
      sha256: None,
      force: false,
    }
  }

  /// Verify the body against a lowercase hex SHA256 before writing it.
  pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
    self.sha256 = Some(sha256.into().to_lowercase());
    self
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  pub fn download_path(&self) -> &Path {
    &self.download_path
  }
}

impl Job for DownloadJob {
  fn label(&self) -> String {
    format!("Download Job: {} to {}", self.url, self.download_path.display())
  }

  fn needs_to_run(&self, _ctx: &JobContext<'_>) -> Result<bool, JobError> {
    let needed = self.force || !self.download_path.exists();
    if !needed {
      info!(path = %self.download_path.display(), "Download Job: already downloaded");
    }
    Ok(needed)
  }

  fn run(&mut self, _ctx: &mut JobContext<'_>) -> Result<(), JobError> {
    info!(url = %self.url, path = %self.download_path.display(), "Download Job");
    fetch_url(&self.url, &self.download_path, self.sha256.as_deref())
  }

  fn apply_flags(&mut self, flags: &JobFlags) {
    self.force = flags.force;
  }
}

/// Fetch a URL and save it to `dest`, verifying a SHA256 hash when given.
pub fn fetch_url(url: &str, dest: &Path, expected_sha256: Option<&str>) -> Result<(), JobError> {
  if let Some(parent) = dest.parent() {
    fs::create_dir_all(parent)?;
  }

  let response = reqwest::blocking::get(url).map_err(|e| JobError::FetchFailed {
    url: url.to_string(),
    message: e.to_string(),
  })?;

  if !response.status().is_success() {
    return Err(JobError::FetchFailed {
      url: url.to_string(),
      message: format!("HTTP {}", response.status()),
    });
  }

  let bytes = response.bytes().map_err(|e| JobError::FetchFailed {
    url: url.to_string(),
    message: e.to_string(),
  })?;

  if let Some(expected) = expected_sha256 {
    let actual = hex::encode(Sha256::digest(&bytes));
    if actual != expected {
      return Err(JobError::HashMismatch {
        url: url.to_string(),
        expected: expected.to_string(),
        actual,
      });
    }
  }

  fs::write(dest, &bytes)?;

  info!(path = %dest.display(), size = bytes.len(), "download complete");
  Ok(())
}

/// Convert a URL to a safe filename.
///
/// Takes the last path component with any query or fragment removed. Falls
/// back to a hash of the URL if no usable name remains.
pub fn url_to_filename(url: &str) -> String {
  let without_query = url.split(['?', '#']).next().unwrap_or(url);
  let last = without_query.rsplit('/').next().unwrap_or_default();

  let sanitized: String = last
    .chars()
    .map(|c| {
      if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '+' {
        c
      } else {
        '_'
      }
    })
    .collect();

  if !sanitized.is_empty() && sanitized != "." && sanitized != ".." && !without_query.ends_with(":/") {
    return sanitized;
  }

  let digest = hex::encode(Sha256::digest(url.as_bytes()));
  format!("download_{}", &digest[..16])
}
