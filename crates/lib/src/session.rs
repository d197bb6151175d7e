//! Per-invocation execution context.
//!
//! A `Session` is created once per command-line invocation and handed to every
//! `resolve` call. It owns the registry of resolved jobs and the stack of jobs
//! currently being resolved, and is dropped when the invocation ends.

use crate::job::{JobId, Registry};

/// Settings for how external commands are run during a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
  /// Print each external command line before running it.
  pub echo: bool,
  /// Downgrade failing external commands to warnings (lenient mode).
  pub warn: bool,
  /// Do not actually start external commands.
  pub dry: bool,
}

/// Execution context for one invocation.
#[derive(Debug, Default)]
pub struct Session {
  config: SessionConfig,
  registry: Registry,
  visiting: Vec<JobId>,
}

impl Session {
  pub fn new(config: SessionConfig) -> Self {
    Self {
      config,
      registry: Registry::new(),
      visiting: Vec::new(),
    }
  }

  pub fn config(&self) -> &SessionConfig {
    &self.config
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  pub(crate) fn registry_mut(&mut self) -> &mut Registry {
    &mut self.registry
  }

  /// Jobs whose resolution has started but not finished, outermost first.
  pub(crate) fn visiting(&self) -> &[JobId] {
    &self.visiting
  }

  pub(crate) fn enter(&mut self, id: JobId) {
    self.visiting.push(id);
  }

  pub(crate) fn leave(&mut self, id: JobId) {
    debug_assert_eq!(self.visiting.last(), Some(&id));
    self.visiting.pop();
  }
}
