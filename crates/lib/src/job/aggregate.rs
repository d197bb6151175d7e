//! Output-mapping aggregation.
//!
//! Two distinct queries over declared outputs:
//! - [`recursive_outputs`]: graph-shaped, "everything this job depends on".
//! - [`all_resolved_outputs`]: registry-shaped, "everything resolved so far",
//!   in chronological order.
//!
//! Both build a fresh map; no job's declared outputs are ever modified.

use super::{JobId, JobNode, OutputMap, Registry};

/// Merge a job's outputs with those of its dependencies, recursively.
///
/// Starts from a copy of the job's own outputs, then merges each dependency in
/// declaration order. On a key collision the dependency's entry wins, so later
/// dependencies override earlier ones and all dependencies override the job's
/// own entries.
///
/// Dependencies are always visited with `include_self = false`, so one that was
/// not resolved this session contributes nothing (nor does its subgraph) unless
/// `include_unresolved` is set.
pub fn recursive_outputs(nodes: &[JobNode], id: JobId, include_unresolved: bool, include_self: bool) -> OutputMap {
  let node = &nodes[id.0];
  if !(include_self || node.resolved || include_unresolved) {
    return OutputMap::new();
  }

  let mut merged = node.outputs.clone();
  for dep in &node.dependencies {
    merged.extend(recursive_outputs(nodes, *dep, include_unresolved, false));
  }
  merged
}

/// Merge the own outputs of every registered job, oldest first.
///
/// Later registry entries overwrite earlier ones on key collision.
pub fn all_resolved_outputs(nodes: &[JobNode], registry: &Registry) -> OutputMap {
  let mut merged = OutputMap::new();
  for id in registry.iter() {
    merged.extend(nodes[id.0].outputs.iter().map(|(dst, src)| (dst.clone(), src.clone())));
  }
  merged
}
