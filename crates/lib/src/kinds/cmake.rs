//! CMake configure-and-build jobs.
//!
//! Several build jobs can share one [`CMakeProjectConfig`], typically one per
//! preset pair of the same source tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::info;

use super::process::ExternalCommand;
use crate::job::{Job, JobContext, JobError, OutputMap};

/// Where and how to invoke CMake for one source tree.
#[derive(Debug, Clone)]
pub struct CMakeProjectConfig {
  working_dir: PathBuf,
  extended_env: BTreeMap<String, String>,
  cmake_binary: PathBuf,
}

impl CMakeProjectConfig {
  pub fn new(working_dir: impl Into<PathBuf>, extended_env: BTreeMap<String, String>) -> Self {
    Self {
      working_dir: working_dir.into(),
      extended_env,
      cmake_binary: PathBuf::from("cmake"),
    }
  }

  pub fn with_cmake_binary(mut self, cmake_binary: impl Into<PathBuf>) -> Self {
    self.cmake_binary = cmake_binary.into();
    self
  }

  pub fn working_dir(&self) -> &Path {
    &self.working_dir
  }

  fn command(&self, args: &[String]) -> ExternalCommand {
    ExternalCommand::new(&self.cmake_binary)
      .args(args.iter().map(String::as_str))
      .envs(&self.extended_env)
      .current_dir(&self.working_dir)
  }
}

#[derive(Debug, Clone)]
pub struct CMakeBuildJob {
  project: Rc<CMakeProjectConfig>,
  config_args: Vec<String>,
  build_args: Vec<String>,
  outputs: OutputMap,
}

impl CMakeBuildJob {
  pub fn new(
    project: Rc<CMakeProjectConfig>,
    config_args: Vec<String>,
    build_args: Vec<String>,
    outputs: OutputMap,
  ) -> Self {
    Self {
      project,
      config_args,
      build_args,
      outputs,
    }
  }

  /// Configure with `config_preset` and build with `build_preset`, which
  /// defaults to the configure preset.
  pub fn from_preset_pair(
    project: Rc<CMakeProjectConfig>,
    outputs: OutputMap,
    config_preset: &str,
    build_preset: Option<&str>,
  ) -> Self {
    let build_preset = build_preset.unwrap_or(config_preset);
    let config_args = vec![
      "--preset".to_string(),
      config_preset.to_string(),
      project.working_dir.display().to_string(),
    ];
    let build_args = vec!["--build".to_string(), "--preset".to_string(), build_preset.to_string()];
    Self::new(project, config_args, build_args, outputs)
  }

  pub fn config_args(&self) -> &[String] {
    &self.config_args
  }

  pub fn build_args(&self) -> &[String] {
    &self.build_args
  }
}

impl Job for CMakeBuildJob {
  fn label(&self) -> String {
    format!(
      "CMake Build Job: {} ({})",
      self.project.working_dir.display(),
      self.build_args.join(" ")
    )
  }

  fn declared_outputs(&self) -> OutputMap {
    self.outputs.clone()
  }

  fn run(&mut self, ctx: &mut JobContext<'_>) -> Result<(), JobError> {
    info!(dir = %self.project.working_dir.display(), "CMake Build Job: configure");
    self.project.command(&self.config_args).run(ctx.config())?;
    info!(dir = %self.project.working_dir.display(), "CMake Build Job: build");
    self.project.command(&self.build_args).run(ctx.config())?;
    Ok(())
  }
}
