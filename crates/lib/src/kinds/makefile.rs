use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use super::process::ExternalCommand;
use crate::job::{Job, JobContext, JobError};

/// Run `make -f <makefile>` with an extended environment.
#[derive(Debug, Clone)]
pub struct MakefileJob {
  makefile_path: PathBuf,
  extended_env: BTreeMap<String, String>,
  make_binary: PathBuf,
  working_dir: Option<PathBuf>,
}

impl MakefileJob {
  pub fn new(makefile_path: impl Into<PathBuf>, extended_env: BTreeMap<String, String>) -> Self {
    Self {
      makefile_path: makefile_path.into(),
      extended_env,
      make_binary: PathBuf::from("make"),
      working_dir: None,
    }
  }

  /// Use a specific `make` instead of the one on `PATH`.
  pub fn with_make_binary(mut self, make_binary: impl Into<PathBuf>) -> Self {
    self.make_binary = make_binary.into();
    self
  }

  pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.working_dir = Some(dir.into());
    self
  }

  pub fn makefile_path(&self) -> &Path {
    &self.makefile_path
  }

  fn command(&self) -> ExternalCommand {
    let cmd = ExternalCommand::new(&self.make_binary)
      .arg("-f")
      .arg(&self.makefile_path)
      .envs(&self.extended_env);
    match &self.working_dir {
      Some(dir) => cmd.current_dir(dir),
      None => cmd,
    }
  }
}

impl Job for MakefileJob {
  fn label(&self) -> String {
    format!("Makefile Job: {}", self.makefile_path.display())
  }

  fn run(&mut self, ctx: &mut JobContext<'_>) -> Result<(), JobError> {
    info!(makefile = %self.makefile_path.display(), "Makefile Job");
    self.command().run(ctx.config())?;
    Ok(())
  }
}
