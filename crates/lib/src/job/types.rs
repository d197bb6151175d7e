//! Error and flag types for job resolution.
//!
//! `JobError` is what a concrete job kind reports from `needs_to_run` or `run`.
//! `ResolveError` is what the engine reports to its caller: either a wrapped
//! job failure or a structural problem with the graph itself.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a job's capability methods.
#[derive(Debug, Error)]
pub enum JobError {
  /// I/O error while running a job.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// HTTP request failed during a download.
  #[error("fetch failed for {url}: {message}")]
  FetchFailed { url: String, message: String },

  /// SHA256 hash mismatch after download.
  #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
  HashMismatch {
    url: String,
    expected: String,
    actual: String,
  },

  /// The archive extension is not one we know how to unpack.
  #[error("unsupported archive format: {}", .0.display())]
  UnsupportedArchive(PathBuf),

  /// Reading or writing an archive failed.
  #[error("archive error for {}: {message}", path.display())]
  Archive { path: PathBuf, message: String },

  /// An external program could not be started at all.
  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// An external program exited unsuccessfully and lenient mode was off.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CommandFailed { cmd: String, code: Option<i32> },

  /// Copying a collected output file failed.
  #[error("failed to copy {} to {}: {source}", src.display(), dst.display())]
  Copy {
    src: PathBuf,
    dst: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A mod TOML could not be read or is missing a required key.
  #[error("invalid mod toml {}: {message}", path.display())]
  ModToml { path: PathBuf, message: String },

  /// JSON serialization failed.
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Free-form failure from a job kind defined outside this crate.
  #[error("{0}")]
  Custom(String),
}

/// Errors reported by `JobGraph::resolve`.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// A job's `needs_to_run` or `run` failed. Resolution stopped here.
  #[error("job '{job}' failed: {source}")]
  Job {
    job: String,
    #[source]
    source: JobError,
  },

  /// The dependency graph loops back onto a job that is still resolving.
  #[error("dependency cycle detected: {}", path.join(" -> "))]
  Cycle { path: Vec<String> },
}

/// Per-invocation switches handed from the command surface to selected jobs.
///
/// Each job kind picks the flags it understands through `Job::apply_flags`;
/// the rest are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFlags {
  /// Redo the work even if the job's existence check says it is done.
  pub force: bool,
  /// Collectors also take outputs from dependencies not resolved this run.
  pub include_unresolved: bool,
  /// Collectors also take outputs from every job in the registry.
  pub include_all_resolved: bool,
  /// Mod TOML jobs rewrite backslashes in the produced archive.
  pub path_fix: bool,
}
