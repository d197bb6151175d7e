use std::time::Instant;

use anyhow::{Context, Result};

use modbuild_lib::job::JobFlags;
use modbuild_lib::project::Project;
use modbuild_lib::session::Session;

use crate::output::{print_grouped_listing, print_phase, print_summary};

/// Run CMake builds by group. Without `groups` every group runs; `builds`
/// narrows each selected group to the named builds.
pub fn cmd_cmake(
  project: &mut Project,
  session: &mut Session,
  list: bool,
  skip_dependencies: bool,
  groups: Option<&str>,
  builds: Option<&str>,
) -> Result<()> {
  if list {
    print_grouped_listing(
      "Listing CMake build groups and names:",
      project
        .cmake_groups()
        .iter()
        .map(|(group, collection)| (group.as_str(), collection.names())),
    );
    return Ok(());
  }

  let ids = project.select_cmake(groups, builds)?;
  print_phase("Running CMake builds:");
  let start = Instant::now();
  project
    .resolve(&ids, session, skip_dependencies, &JobFlags::default())
    .context("CMake build failed")?;

  print_summary(ids.len(), "CMake build", start.elapsed());
  Ok(())
}
