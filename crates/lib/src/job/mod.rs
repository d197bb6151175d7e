//! Job graph and the resolution engine.
//!
//! Jobs are owned by a [`JobGraph`] arena and referenced by [`JobId`] handles,
//! so one job can be a dependency of many others. Resolution is synchronous and
//! depth-first:
//!
//! 1. A job already resolved this session returns immediately, unless it allows
//!    re-resolution.
//! 2. `needs_to_run` decides whether the job does anything at all. When it
//!    returns false the job's whole dependency subgraph is left untouched.
//! 3. Otherwise dependencies are resolved in declaration order, then `run`.
//! 4. The job is marked resolved and appended to the session registry, whether
//!    or not `run` executed.

pub mod aggregate;
pub mod registry;
pub mod types;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::session::{Session, SessionConfig};

pub use registry::Registry;
pub use types::{JobError, JobFlags, ResolveError};

/// Destination path (relative to the collection point, or absolute) to source path.
pub type OutputMap = BTreeMap<PathBuf, PathBuf>;

/// Handle to a job inside a [`JobGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) usize);

impl fmt::Display for JobId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Capability contract implemented by every job kind.
///
/// `needs_to_run` must be free of side effects and must not resolve anything.
/// `run` may assume the job needs to run and that its dependencies have been
/// handled; it never resolves dependencies itself.
pub trait Job {
  /// Short description used in log lines.
  fn label(&self) -> String;

  /// Whether the job has work to do. Defaults to always.
  ///
  /// Returning false also skips the job's dependencies for this session.
  fn needs_to_run(&self, _ctx: &JobContext<'_>) -> Result<bool, JobError> {
    Ok(true)
  }

  /// Perform the job's effect. Defaults to doing nothing.
  fn run(&mut self, _ctx: &mut JobContext<'_>) -> Result<(), JobError> {
    Ok(())
  }

  /// Outputs known when the job is constructed, seeded into the graph by [`JobGraph::add`].
  fn declared_outputs(&self) -> OutputMap {
    OutputMap::new()
  }

  /// Take the per-invocation flags this kind understands.
  fn apply_flags(&mut self, _flags: &JobFlags) {}
}

/// Graph-side state of a job: everything except its behavior.
#[derive(Debug, Clone)]
pub struct JobNode {
  name: String,
  dependencies: Vec<JobId>,
  outputs: OutputMap,
  resolved: bool,
  allow_re_resolution: bool,
}

impl JobNode {
  fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      dependencies: Vec::new(),
      outputs: OutputMap::new(),
      resolved: false,
      allow_re_resolution: false,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn dependencies(&self) -> &[JobId] {
    &self.dependencies
  }

  pub fn outputs(&self) -> &OutputMap {
    &self.outputs
  }

  pub fn is_resolved(&self) -> bool {
    self.resolved
  }

  pub fn allows_re_resolution(&self) -> bool {
    self.allow_re_resolution
  }
}

/// What a job sees while its capability methods run.
pub struct JobContext<'a> {
  id: JobId,
  nodes: &'a [JobNode],
  session: &'a Session,
  added: OutputMap,
}

impl<'a> JobContext<'a> {
  fn new(id: JobId, nodes: &'a [JobNode], session: &'a Session) -> Self {
    Self {
      id,
      nodes,
      session,
      added: OutputMap::new(),
    }
  }

  pub fn id(&self) -> JobId {
    self.id
  }

  pub fn name(&self) -> &str {
    &self.nodes[self.id.0].name
  }

  pub fn config(&self) -> &SessionConfig {
    self.session.config()
  }

  /// This job's outputs merged with its dependencies', see [`aggregate::recursive_outputs`].
  pub fn recursive_outputs(&self, include_unresolved: bool) -> OutputMap {
    aggregate::recursive_outputs(self.nodes, self.id, include_unresolved, true)
  }

  /// Own outputs of every job resolved so far, see [`aggregate::all_resolved_outputs`].
  pub fn all_resolved_outputs(&self) -> OutputMap {
    aggregate::all_resolved_outputs(self.nodes, self.session.registry())
  }

  /// Extend this job's outputs. Applied once `run` returns successfully.
  pub fn add_outputs(&mut self, outputs: OutputMap) {
    self.added.extend(outputs);
  }
}

/// Arena of jobs and their dependency edges.
#[derive(Default)]
pub struct JobGraph {
  nodes: Vec<JobNode>,
  jobs: Vec<Box<dyn Job>>,
}

impl JobGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a job, seeding its outputs from [`Job::declared_outputs`].
  pub fn add(&mut self, name: impl Into<String>, job: impl Job + 'static) -> JobId {
    self.add_boxed(name, Box::new(job))
  }

  pub fn add_boxed(&mut self, name: impl Into<String>, job: Box<dyn Job>) -> JobId {
    let id = JobId(self.nodes.len());
    let mut node = JobNode::new(name);
    node.outputs = job.declared_outputs();
    self.nodes.push(node);
    self.jobs.push(job);
    id
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Graph-side state of a job.
  ///
  /// # Panics
  ///
  /// Panics if `id` was not produced by this graph.
  pub fn node(&self, id: JobId) -> &JobNode {
    &self.nodes[id.0]
  }

  pub fn ids(&self) -> impl Iterator<Item = JobId> + '_ {
    (0..self.nodes.len()).map(JobId)
  }

  /// Append dependencies to a job, after any already declared.
  pub fn declare_dependencies(&mut self, id: JobId, dependencies: impl IntoIterator<Item = JobId>) -> &mut Self {
    self.nodes[id.0].dependencies.extend(dependencies);
    self
  }

  /// Merge extra outputs into a job; the new entries win on key collision.
  pub fn add_outputs(&mut self, id: JobId, outputs: OutputMap) -> &mut Self {
    self.nodes[id.0].outputs.extend(outputs);
    self
  }

  pub fn set_allow_re_resolution(&mut self, id: JobId, allow: bool) -> &mut Self {
    self.nodes[id.0].allow_re_resolution = allow;
    self
  }

  pub fn apply_flags(&mut self, id: JobId, flags: &JobFlags) -> &mut Self {
    self.jobs[id.0].apply_flags(flags);
    self
  }

  /// Resolve a job: run it if needed, after its dependencies.
  ///
  /// `skip_dependencies` only suppresses this job's own dependency step. A
  /// dependency that does start resolving always resolves its own dependencies.
  ///
  /// On error the failing job is neither marked resolved nor registered, and
  /// nothing after it in the chain runs.
  pub fn resolve(&mut self, id: JobId, session: &mut Session, skip_dependencies: bool) -> Result<(), ResolveError> {
    let node = &self.nodes[id.0];
    if node.resolved && !node.allow_re_resolution {
      debug!(job = %node.name, "already resolved");
      return Ok(());
    }

    if let Some(start) = session.visiting().iter().position(|v| *v == id) {
      let path = session.visiting()[start..]
        .iter()
        .chain(std::iter::once(&id))
        .map(|v| self.nodes[v.0].name.clone())
        .collect();
      return Err(ResolveError::Cycle { path });
    }

    session.enter(id);
    let result = self.resolve_entered(id, session, skip_dependencies);
    session.leave(id);
    result?;

    self.nodes[id.0].resolved = true;
    session.registry_mut().push(id);
    Ok(())
  }

  fn resolve_entered(&mut self, id: JobId, session: &mut Session, skip_dependencies: bool) -> Result<(), ResolveError> {
    let name = self.nodes[id.0].name.clone();

    let needed = {
      let ctx = JobContext::new(id, &self.nodes, session);
      self.jobs[id.0]
        .needs_to_run(&ctx)
        .map_err(|source| ResolveError::Job { job: name.clone(), source })?
    };

    if !needed {
      debug!(job = %name, "not needed, leaving dependencies untouched");
      return Ok(());
    }

    if skip_dependencies {
      debug!(job = %name, "skipping dependencies");
    } else {
      let dependencies = self.nodes[id.0].dependencies.clone();
      for dep in dependencies {
        self.resolve(dep, session, false)?;
      }
    }

    info!(job = %name, label = %self.jobs[id.0].label(), "running job");
    let mut ctx = JobContext::new(id, &self.nodes, session);
    self.jobs[id.0]
      .run(&mut ctx)
      .map_err(|source| ResolveError::Job { job: name, source })?;
    let added = ctx.added;

    self.nodes[id.0].outputs.extend(added);
    Ok(())
  }

  /// See [`aggregate::recursive_outputs`].
  pub fn recursive_outputs(&self, id: JobId, include_unresolved: bool, include_self: bool) -> OutputMap {
    aggregate::recursive_outputs(&self.nodes, id, include_unresolved, include_self)
  }

  /// See [`aggregate::all_resolved_outputs`].
  pub fn all_resolved_outputs(&self, registry: &Registry) -> OutputMap {
    aggregate::all_resolved_outputs(&self.nodes, registry)
  }
}

impl fmt::Debug for JobGraph {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("JobGraph").field("nodes", &self.nodes).finish()
  }
}
