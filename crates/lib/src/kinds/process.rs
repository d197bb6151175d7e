//! External command execution.
//!
//! Every job kind that shells out goes through [`ExternalCommand`], which
//! applies the session's echo, dry-run and lenient settings in one place.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, error, warn};

use crate::job::JobError;
use crate::session::SessionConfig;

/// How a command invocation ended, when it did not fail the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
  /// Dry run: the command was not started.
  Skipped,
  /// Exited with status zero.
  Succeeded,
  /// Exited unsuccessfully, downgraded to a warning.
  Warned { code: Option<i32> },
}

/// A program invocation with an extended environment.
///
/// The child inherits this process's environment and stdio; `envs` adds to or
/// overrides individual variables.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
  program: PathBuf,
  args: Vec<OsString>,
  env: BTreeMap<String, String>,
  cwd: Option<PathBuf>,
  required: bool,
}

impl ExternalCommand {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      env: BTreeMap::new(),
      cwd: None,
      required: true,
    }
  }

  pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
    self.env.extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// A non-required command only ever warns on failure.
  pub fn required(mut self, required: bool) -> Self {
    self.required = required;
    self
  }

  /// The command line as it would be typed, for logs and echo.
  pub fn display(&self) -> String {
    std::iter::once(self.program.as_os_str())
      .chain(self.args.iter().map(OsString::as_os_str))
      .map(|part| part.to_string_lossy().into_owned())
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Run to completion, honoring `echo`, `dry` and `warn` from the session.
  pub fn run(&self, config: &SessionConfig) -> Result<CommandOutcome, JobError> {
    let line = self.display();

    if config.echo {
      println!("{}", line);
    }

    if config.dry {
      debug!(cmd = %line, "dry run, not starting command");
      return Ok(CommandOutcome::Skipped);
    }

    let mut command = Command::new(&self.program);
    command.args(&self.args).envs(&self.env);
    if let Some(cwd) = &self.cwd {
      command.current_dir(cwd);
    }

    debug!(cmd = %line, cwd = ?self.cwd, "spawning process");

    let status = command.status().map_err(|source| JobError::Spawn {
      program: self.program.display().to_string(),
      source,
    })?;

    if status.success() {
      return Ok(CommandOutcome::Succeeded);
    }

    if config.warn || !self.required {
      warn!(cmd = %line, code = ?status.code(), "command returned non-zero exit status, continuing");
      return Ok(CommandOutcome::Warned { code: status.code() });
    }

    error!(cmd = %line, code = ?status.code(), "command returned non-zero exit status");
    Err(JobError::CommandFailed {
      cmd: line,
      code: status.code(),
    })
  }
}
