//! The job-running subcommands that share one shape: pick jobs of one kind by
//! name, apply the command's flags to them, resolve them in order.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use modbuild_lib::job::JobFlags;
use modbuild_lib::project::{Collection, Project};
use modbuild_lib::session::Session;

use crate::output::{print_listing, print_phase, print_summary, print_warning};

/// Selection options shared by the job subcommands.
#[derive(Debug, Clone, Default, Args)]
pub struct SelectArgs {
  /// List the available names, then exit.
  #[arg(long)]
  pub list: bool,

  /// Do not resolve the selected jobs' dependencies.
  #[arg(long)]
  pub skip_dependencies: bool,

  /// Only run these jobs (comma-separated names).
  #[arg(long, value_name = "NAMES")]
  pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Download,
  Extract,
  Makefile,
  Nrm,
  Build,
  Thunderstore,
}

impl Phase {
  fn collection(self, project: &Project) -> &Collection {
    match self {
      Phase::Download => project.downloads(),
      Phase::Extract => project.extractions(),
      Phase::Makefile => project.makefiles(),
      Phase::Nrm => project.mod_tomls(),
      Phase::Build => project.build_outputs(),
      Phase::Thunderstore => project.thunderstore_packages(),
    }
  }

  fn list_header(self) -> &'static str {
    match self {
      Phase::Download => "Listing download job names:",
      Phase::Extract => "Listing extraction names:",
      Phase::Makefile => "Listing makefile names:",
      Phase::Nrm => "Listing mod toml names:",
      Phase::Build => "Listing build output folder names:",
      Phase::Thunderstore => "Listing Thunderstore package names:",
    }
  }

  fn run_header(self) -> &'static str {
    match self {
      Phase::Download => "Performing downloads...",
      Phase::Extract => "Extracting archives...",
      Phase::Makefile => "Running makefiles...",
      Phase::Nrm => "Building NRM files...",
      Phase::Build => "Preparing build output folders...",
      Phase::Thunderstore => "Preparing Thunderstore packages...",
    }
  }
}

/// Run one phase: list, or resolve the selected jobs with `flags`.
pub fn cmd_jobs(
  project: &mut Project,
  session: &mut Session,
  phase: Phase,
  select: &SelectArgs,
  flags: &JobFlags,
) -> Result<()> {
  let collection = phase.collection(project);
  if select.list {
    print_listing(phase.list_header(), collection.names());
    return Ok(());
  }

  let ids = collection.select(select.name.as_deref())?;
  if ids.is_empty() {
    print_warning(&format!("No {} entries in the project", collection.kind()));
    return Ok(());
  }
  debug!(?phase, count = ids.len(), skip_dependencies = select.skip_dependencies, "resolving selection");
  print_phase(phase.run_header());

  let start = Instant::now();
  project
    .resolve(&ids, session, select.skip_dependencies, flags)
    .context("Job failed")?;

  print_summary(ids.len(), "job", start.elapsed());
  Ok(())
}
