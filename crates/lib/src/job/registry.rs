//! Chronological record of resolved jobs.

use super::JobId;

/// Every job that completed `resolve` in the current session, in completion order.
///
/// Jobs whose `needs_to_run` returned false are recorded too. A job with
/// `allow_re_resolution` appears once per completed resolution.
#[derive(Debug, Clone, Default)]
pub struct Registry {
  resolved: Vec<JobId>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn push(&mut self, id: JobId) {
    self.resolved.push(id);
  }

  /// Iterate resolved jobs in the order they completed.
  pub fn iter(&self) -> impl Iterator<Item = JobId> + '_ {
    self.resolved.iter().copied()
  }

  pub fn contains(&self, id: JobId) -> bool {
    self.resolved.contains(&id)
  }

  pub fn len(&self) -> usize {
    self.resolved.len()
  }

  pub fn is_empty(&self) -> bool {
    self.resolved.is_empty()
  }
}
