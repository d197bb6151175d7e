//! Copy collected outputs into an output directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::job::{Job, JobContext, JobError, JobFlags, OutputMap};

/// Collects the outputs of its dependencies into `output_dir`.
///
/// Relative destinations are placed under `output_dir`; absolute ones are
/// written where they point.
#[derive(Debug, Clone)]
pub struct BuildOutputJob {
  output_dir: PathBuf,
  include_unresolved: bool,
  include_all_resolved: bool,
}

impl BuildOutputJob {
  pub fn new(output_dir: impl Into<PathBuf>) -> Self {
    Self {
      output_dir: output_dir.into(),
      include_unresolved: false,
      include_all_resolved: false,
    }
  }

  pub fn output_dir(&self) -> &Path {
    &self.output_dir
  }

  fn copy_all(&self, outputs: &OutputMap) -> Result<(), JobError> {
    for (dst, src) in outputs {
      let dst = if dst.is_absolute() {
        dst.clone()
      } else {
        self.output_dir.join(dst)
      };

      info!("Copying '{}' to '{}'...", src.display(), dst.display());
      if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
      }
      fs::copy(src, &dst).map_err(|source| JobError::Copy {
        src: src.clone(),
        dst: dst.clone(),
        source,
      })?;
    }
    Ok(())
  }
}

impl Job for BuildOutputJob {
  fn label(&self) -> String {
    format!("Build Output Job: {}", self.output_dir.display())
  }

  fn run(&mut self, ctx: &mut JobContext<'_>) -> Result<(), JobError> {
    info!(dir = %self.output_dir.display(), "Build Output Job");
    fs::create_dir_all(&self.output_dir)?;

    self.copy_all(&ctx.recursive_outputs(self.include_unresolved))?;
    if self.include_all_resolved {
      self.copy_all(&ctx.all_resolved_outputs())?;
    }
    Ok(())
  }

  fn apply_flags(&mut self, flags: &JobFlags) {
    self.include_unresolved = flags.include_unresolved;
    self.include_all_resolved = flags.include_all_resolved;
  }
}
