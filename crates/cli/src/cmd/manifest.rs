//! Implementation of the `modbuild manifest` command.
//!
//! Writes a Thunderstore package's `manifest.json` without resolving any job.
//! CI uses it to read package metadata.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use modbuild_lib::project::Project;

use crate::output::{print_done, print_listing};

/// Write the manifest of each selected package.
///
/// The file defaults to `<manifest name>.json` in the working directory.
pub fn cmd_manifest(project: &Project, list: bool, name: Option<&str>, output_file: Option<&Path>) -> Result<()> {
  let packages = project.thunderstore_packages();
  if list {
    print_listing("Listing Thunderstore package names:", packages.names());
    return Ok(());
  }

  for (entry, _) in packages.select_entries(name)? {
    let manifest = project
      .manifest(entry)
      .ok_or_else(|| anyhow!("no manifest for package '{}'", entry))?;
    let output = match output_file {
      Some(path) => path.to_path_buf(),
      None => PathBuf::from(format!("{}.json", manifest.name)),
    };

    manifest
      .write(&output)
      .with_context(|| format!("Failed to write {}", output.display()))?;
    print_done(&format!("Wrote {}", output.display()));
  }
  Ok(())
}
