//! Serde model of the project file.
//!
//! Every job entry is a table in an array named after its kind. The common
//! keys (`depends_on`, `outputs`, `allow_re_resolution`, `platforms`, `archs`)
//! are flattened into each entry.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::kinds::PackageManifest;
use crate::platform::{Arch, Os};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
  #[serde(default)]
  pub project: ProjectSettings,
  #[serde(default)]
  pub downloads: Vec<DownloadDef>,
  #[serde(default)]
  pub extractions: Vec<ExtractionDef>,
  #[serde(default)]
  pub makefiles: Vec<MakefileDef>,
  #[serde(default)]
  pub cmake_projects: Vec<CMakeProjectDef>,
  #[serde(default)]
  pub cmake_builds: Vec<CMakeBuildDef>,
  #[serde(default)]
  pub mod_tomls: Vec<ModTomlDef>,
  #[serde(default)]
  pub build_outputs: Vec<BuildOutputDef>,
  #[serde(default)]
  pub thunderstore_packages: Vec<ThunderstoreDef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSettings {
  /// Base for relative paths, itself relative to the project file's directory.
  pub root: Option<PathBuf>,
  #[serde(default)]
  pub clean_paths: Vec<PathBuf>,
  #[serde(default)]
  pub distclean_paths: Vec<PathBuf>,
  #[serde(default)]
  pub nrm_path_fix_by_default: bool,
}

/// Keys accepted by every job entry.
#[derive(Debug, Default, Deserialize)]
pub struct CommonDef {
  /// References such as `download:NAME` or `cmake:GROUP/NAME`.
  #[serde(default)]
  pub depends_on: Vec<String>,
  /// Extra outputs, destination to source. Sources are relative to the root.
  #[serde(default)]
  pub outputs: BTreeMap<String, PathBuf>,
  #[serde(default)]
  pub allow_re_resolution: bool,
  /// Hosts the entry applies to; empty means all.
  #[serde(default)]
  pub platforms: Vec<Os>,
  /// CPU architectures the entry applies to; empty means all.
  #[serde(default)]
  pub archs: Vec<Arch>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadDef {
  pub name: String,
  pub url: String,
  /// Directory to download into, keeping the URL's file name.
  pub dir: Option<PathBuf>,
  /// Exact destination file. Takes precedence over `dir`.
  pub path: Option<PathBuf>,
  pub sha256: Option<String>,
  #[serde(flatten)]
  pub common: CommonDef,
}

#[derive(Debug, Deserialize)]
pub struct ExtractionDef {
  pub name: String,
  pub archive: Option<PathBuf>,
  /// Name of a download whose file is the archive.
  pub download: Option<String>,
  pub dest: PathBuf,
  #[serde(flatten)]
  pub common: CommonDef,
}

#[derive(Debug, Deserialize)]
pub struct MakefileDef {
  pub name: String,
  pub makefile: PathBuf,
  #[serde(default)]
  pub env: BTreeMap<String, String>,
  pub make: Option<PathBuf>,
  #[serde(flatten)]
  pub common: CommonDef,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CMakeProjectDef {
  pub name: String,
  pub working_dir: PathBuf,
  #[serde(default)]
  pub env: BTreeMap<String, String>,
  pub cmake: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct CMakeBuildDef {
  pub group: String,
  pub name: String,
  pub project: String,
  pub preset: Option<String>,
  pub build_preset: Option<String>,
  pub config_args: Option<Vec<String>>,
  pub build_args: Option<Vec<String>>,
  #[serde(flatten)]
  pub common: CommonDef,
}

#[derive(Debug, Deserialize)]
pub struct ModTomlDef {
  pub name: String,
  pub tool: PathBuf,
  pub toml: PathBuf,
  pub build_dir: Option<PathBuf>,
  #[serde(flatten)]
  pub common: CommonDef,
}

#[derive(Debug, Deserialize)]
pub struct BuildOutputDef {
  pub name: String,
  pub path: PathBuf,
  #[serde(flatten)]
  pub common: CommonDef,
}

#[derive(Debug, Deserialize)]
pub struct ThunderstoreDef {
  pub name: String,
  pub file: PathBuf,
  pub manifest: Option<PackageManifest>,
  /// Name of a mod TOML entry to derive the manifest from.
  pub manifest_from: Option<String>,
  /// Used with `manifest_from`; the git remote is queried when absent.
  pub website_url: Option<String>,
  #[serde(default)]
  pub dependencies: Vec<String>,
  pub readme: PathBuf,
  pub changelog: PathBuf,
  pub icon: PathBuf,
  #[serde(flatten)]
  pub common: CommonDef,
}
