//! Removal of build products and downloaded artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CleanError {
  #[error("failed to delete {}: {source}", path.display())]
  Delete {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// What happened to one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CleanOutcome {
  Deleted,
  /// Nothing existed at the path.
  Missing,
}

#[derive(Debug, Default, Serialize)]
pub struct CleanResult {
  pub entries: Vec<(PathBuf, CleanOutcome)>,
}

impl CleanResult {
  pub fn deleted(&self) -> usize {
    self
      .entries
      .iter()
      .filter(|(_, outcome)| *outcome == CleanOutcome::Deleted)
      .count()
  }
}

/// Delete each path, file or directory tree. Missing paths are not an error.
pub fn remove_paths<P: AsRef<Path>>(paths: &[P]) -> Result<CleanResult, CleanError> {
  let mut result = CleanResult::default();
  for path in paths {
    let path = path.as_ref();
    let outcome = remove_path(path)?;
    result.entries.push((path.to_path_buf(), outcome));
  }

  info!(deleted = result.deleted(), total = result.entries.len(), "clean complete");
  Ok(result)
}

fn remove_path(path: &Path) -> Result<CleanOutcome, CleanError> {
  let delete_error = |source: io::Error| CleanError::Delete {
    path: path.to_path_buf(),
    source,
  };

  // symlink_metadata so a link to a directory removes the link, not the target.
  let meta = match fs::symlink_metadata(path) {
    Ok(meta) => meta,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      debug!(path = %path.display(), "nothing to delete");
      return Ok(CleanOutcome::Missing);
    }
    Err(e) => return Err(delete_error(e)),
  };

  if meta.is_dir() {
    fs::remove_dir_all(path).map_err(delete_error)?;
  } else {
    fs::remove_file(path).map_err(delete_error)?;
  }

  debug!(path = %path.display(), "deleted");
  Ok(CleanOutcome::Deleted)
}
