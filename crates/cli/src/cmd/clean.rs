use std::path::PathBuf;

use anyhow::{Context, Result};

use modbuild_lib::clean::{CleanOutcome, CleanResult, remove_paths};
use modbuild_lib::project::Project;

use crate::output::{OutputFormat, print_done, print_json, print_phase, print_skipped};

pub fn cmd_clean(project: &Project, output: OutputFormat) -> Result<()> {
  let cleaned = remove(&project.clean_paths())?;
  if output.is_json() {
    print_json(&serde_json::json!({ "clean": cleaned }))?;
  } else {
    print_phase("Cleaning...");
    report(&cleaned);
  }
  Ok(())
}

/// Clean, then remove downloaded and extracted artifacts as well.
pub fn cmd_distclean(project: &Project, output: OutputFormat) -> Result<()> {
  let cleaned = remove(&project.clean_paths())?;
  let distcleaned = remove(&project.distclean_paths())?;
  if output.is_json() {
    print_json(&serde_json::json!({ "clean": cleaned, "distclean": distcleaned }))?;
  } else {
    print_phase("Cleaning...");
    report(&cleaned);
    print_phase("Distcleaning...");
    report(&distcleaned);
  }
  Ok(())
}

fn remove(paths: &[PathBuf]) -> Result<CleanResult> {
  remove_paths(paths).context("Clean failed")
}

fn report(result: &CleanResult) {
  for (path, outcome) in &result.entries {
    match outcome {
      CleanOutcome::Deleted => print_done(&format!("Deleted {}", path.display())),
      CleanOutcome::Missing => print_skipped(&format!("Nothing to delete at {}", path.display())),
    }
  }
}
