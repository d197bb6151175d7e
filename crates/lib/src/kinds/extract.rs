//! Unpack a downloaded archive.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::Archive;
use tracing::info;
use xz2::read::XzDecoder;

use crate::job::{Job, JobContext, JobError, JobFlags};

#[derive(Debug, Clone)]
pub struct ArchiveExtractJob {
  archive_path: PathBuf,
  extract_dir: PathBuf,
  force: bool,
}

impl ArchiveExtractJob {
  pub fn new(archive_path: impl Into<PathBuf>, extract_dir: impl Into<PathBuf>) -> Self {
    Self {
      archive_path: archive_path.into(),
      extract_dir: extract_dir.into(),
      force: false,
    }
  }

  pub fn archive_path(&self) -> &Path {
    &self.archive_path
  }

  pub fn extract_dir(&self) -> &Path {
    &self.extract_dir
  }
}

impl Job for ArchiveExtractJob {
  fn label(&self) -> String {
    format!(
      "Extract Job: {} to {}",
      self.archive_path.display(),
      self.extract_dir.display()
    )
  }

  fn needs_to_run(&self, _ctx: &JobContext<'_>) -> Result<bool, JobError> {
    let needed = self.force || !self.extract_dir.exists();
    if !needed {
      info!(path = %self.extract_dir.display(), "Extract Job: already extracted");
    }
    Ok(needed)
  }

  fn run(&mut self, _ctx: &mut JobContext<'_>) -> Result<(), JobError> {
    info!(archive = %self.archive_path.display(), dest = %self.extract_dir.display(), "Extract Job");
    if let Some(parent) = self.extract_dir.parent() {
      fs::create_dir_all(parent)?;
    }
    unpack_archive(&self.archive_path, &self.extract_dir)
  }

  fn apply_flags(&mut self, flags: &JobFlags) {
    self.force = flags.force;
  }
}

/// Unpack an archive into `dest`, keeping entry paths as they are.
///
/// Supports:
/// - `.tar.gz` / `.tgz`
/// - `.tar.xz` / `.txz`
/// - `.tar.bz2` / `.tbz2`
/// - `.tar`
/// - `.zip`
pub fn unpack_archive(archive_path: &Path, dest: &Path) -> Result<(), JobError> {
  let name = archive_path
    .file_name()
    .map(|n| n.to_string_lossy().to_lowercase())
    .unwrap_or_default();
  let has_ext = |exts: &[&str]| exts.iter().any(|ext| name.ends_with(ext));

  if has_ext(&[".tar.gz", ".tgz"]) {
    unpack_tar(GzDecoder::new(open(archive_path)?), dest)?;
  } else if has_ext(&[".tar.xz", ".txz"]) {
    unpack_tar(XzDecoder::new(open(archive_path)?), dest)?;
  } else if has_ext(&[".tar.bz2", ".tbz2"]) {
    unpack_tar(BzDecoder::new(open(archive_path)?), dest)?;
  } else if has_ext(&[".tar"]) {
    unpack_tar(open(archive_path)?, dest)?;
  } else if has_ext(&[".zip"]) {
    fs::create_dir_all(dest)?;
    unpack_zip(archive_path, dest)?;
  } else {
    return Err(JobError::UnsupportedArchive(archive_path.to_path_buf()));
  }

  info!("Unpacked to {}", dest.display());
  Ok(())
}

fn open(path: &Path) -> Result<BufReader<File>, JobError> {
  Ok(BufReader::new(File::open(path)?))
}

fn unpack_tar(reader: impl Read, dest: &Path) -> Result<(), JobError> {
  fs::create_dir_all(dest)?;
  Archive::new(reader).unpack(dest)?;
  Ok(())
}

fn unpack_zip(archive_path: &Path, dest: &Path) -> Result<(), JobError> {
  let archive_error = |e: zip::result::ZipError| JobError::Archive {
    path: archive_path.to_path_buf(),
    message: e.to_string(),
  };

  let file = File::open(archive_path)?;
  let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(archive_error)?;
  archive.extract(dest).map_err(archive_error)
}
