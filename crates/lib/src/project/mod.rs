//! Project files: the declarative description of every job in a mod repo.
//!
//! Loading happens in two passes. All jobs are constructed and named first,
//! then the `depends_on` references are wired, so entries can reference each
//! other in any order.

pub mod types;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info};

use crate::consts::ARG_SPLIT_CHAR;
use crate::job::{Job, JobError, JobFlags, JobGraph, JobId, OutputMap, ResolveError};
use crate::kinds::{
  ArchiveExtractJob, BuildOutputJob, CMakeBuildJob, CMakeProjectConfig, DownloadJob, MakefileJob, ModTomlJob,
  PackageManifest, ThunderstorePackageJob,
};
use crate::platform::{self, Host};
use crate::session::Session;

pub use types::ProjectFile;
use types::{CMakeBuildDef, CommonDef, ThunderstoreDef};

#[derive(Debug, Error)]
pub enum ProjectError {
  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse project file: {0}")]
  Parse(#[from] toml::de::Error),

  #[error("duplicate {kind} name '{name}'")]
  DuplicateName { kind: &'static str, name: String },

  #[error("unknown {kind} name '{name}'")]
  UnknownName { kind: &'static str, name: String },

  #[error("invalid reference '{reference}' in '{job}' (expected KIND:NAME)")]
  InvalidReference { job: String, reference: String },

  #[error("unknown reference '{reference}' in '{job}'")]
  UnknownReference { job: String, reference: String },

  #[error("cmake build '{build}' uses unknown cmake project '{project}'")]
  UnknownCMakeProject { build: String, project: String },

  #[error("cmake build '{build}' needs either `preset` or both `config_args` and `build_args`")]
  MissingCMakeArgs { build: String },

  #[error("extraction '{name}' needs either `archive` or `download`")]
  MissingArchive { name: String },

  #[error("thunderstore package '{name}' needs either `manifest` or `manifest_from`")]
  MissingManifest { name: String },

  #[error(transparent)]
  Job(#[from] JobError),
}

/// Named jobs of one kind, in declaration order.
#[derive(Debug, Clone)]
pub struct Collection {
  kind: &'static str,
  entries: Vec<(String, JobId)>,
}

impl Collection {
  fn new(kind: &'static str) -> Self {
    Self {
      kind,
      entries: Vec::new(),
    }
  }

  fn insert(&mut self, name: &str, id: JobId) -> Result<(), ProjectError> {
    if self.get(name).is_some() {
      return Err(ProjectError::DuplicateName {
        kind: self.kind,
        name: name.to_string(),
      });
    }
    self.entries.push((name.to_string(), id));
    Ok(())
  }

  pub fn kind(&self) -> &'static str {
    self.kind
  }

  pub fn get(&self, name: &str) -> Option<JobId> {
    self.entries.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|(name, _)| name.as_str())
  }

  pub fn ids(&self) -> impl Iterator<Item = JobId> + '_ {
    self.entries.iter().map(|(_, id)| *id)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Every job, or only those named in a comma-separated list, in the given order.
  ///
  /// Fails on the first unknown name, before anything is returned.
  pub fn select(&self, names: Option<&str>) -> Result<Vec<JobId>, ProjectError> {
    Ok(self.select_entries(names)?.into_iter().map(|(_, id)| id).collect())
  }

  /// Like [`Collection::select`], keeping the names.
  pub fn select_entries(&self, names: Option<&str>) -> Result<Vec<(&str, JobId)>, ProjectError> {
    match names {
      None => Ok(self.entries.iter().map(|(name, id)| (name.as_str(), *id)).collect()),
      Some(list) => list
        .split(ARG_SPLIT_CHAR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
          self
            .entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, id)| (n.as_str(), *id))
            .ok_or_else(|| ProjectError::UnknownName {
              kind: self.kind,
              name: name.to_string(),
            })
        })
        .collect(),
    }
  }
}

/// A loaded project: the job graph plus the named entry points into it.
#[derive(Debug)]
pub struct Project {
  root: PathBuf,
  graph: JobGraph,
  downloads: Collection,
  extractions: Collection,
  makefiles: Collection,
  mod_tomls: Collection,
  cmake_groups: Vec<(String, Collection)>,
  build_outputs: Collection,
  thunderstore_packages: Collection,
  manifests: BTreeMap<String, PackageManifest>,
  clean_paths: Vec<PathBuf>,
  distclean_paths: Vec<PathBuf>,
  nrm_path_fix_by_default: bool,
}

impl Project {
  /// Load a project file for the current host.
  pub fn load(path: &Path) -> Result<Self, ProjectError> {
    let content = fs::read_to_string(path).map_err(|source| ProjectError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let dir = dunce::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());

    info!(path = %path.display(), "loading project");
    Self::from_toml_str(&content, &dir, Host::current())
  }

  /// Build a project from file contents.
  ///
  /// `base_dir` is the directory the file lives in. Entries restricted to
  /// another OS or architecture than `host` are left out entirely.
  pub fn from_toml_str(content: &str, base_dir: &Path, host: Host) -> Result<Self, ProjectError> {
    let file: ProjectFile = toml::from_str(content)?;
    let root = match &file.project.root {
      Some(root) => base_dir.join(root),
      None => base_dir.to_path_buf(),
    };
    Loader::new(root, host, file.project.nrm_path_fix_by_default).load(file)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn graph(&self) -> &JobGraph {
    &self.graph
  }

  pub fn graph_mut(&mut self) -> &mut JobGraph {
    &mut self.graph
  }

  pub fn downloads(&self) -> &Collection {
    &self.downloads
  }

  pub fn extractions(&self) -> &Collection {
    &self.extractions
  }

  pub fn makefiles(&self) -> &Collection {
    &self.makefiles
  }

  pub fn mod_tomls(&self) -> &Collection {
    &self.mod_tomls
  }

  pub fn cmake_groups(&self) -> &[(String, Collection)] {
    &self.cmake_groups
  }

  pub fn build_outputs(&self) -> &Collection {
    &self.build_outputs
  }

  pub fn thunderstore_packages(&self) -> &Collection {
    &self.thunderstore_packages
  }

  /// Manifest of a Thunderstore package entry, by entry name.
  pub fn manifest(&self, name: &str) -> Option<&PackageManifest> {
    self.manifests.get(name)
  }

  pub fn nrm_path_fix_by_default(&self) -> bool {
    self.nrm_path_fix_by_default
  }

  /// Paths removed by `clean`, resolved against the root.
  pub fn clean_paths(&self) -> Vec<PathBuf> {
    self.clean_paths.iter().map(|p| self.root.join(p)).collect()
  }

  /// Paths removed by `distclean` after the clean paths.
  pub fn distclean_paths(&self) -> Vec<PathBuf> {
    self.distclean_paths.iter().map(|p| self.root.join(p)).collect()
  }

  /// Select CMake builds by group and build name lists.
  ///
  /// Without `groups` every group is selected. A build name must exist in
  /// every selected group.
  pub fn select_cmake(&self, groups: Option<&str>, builds: Option<&str>) -> Result<Vec<JobId>, ProjectError> {
    let selected: Vec<&Collection> = match groups {
      None => self.cmake_groups.iter().map(|(_, c)| c).collect(),
      Some(list) => list
        .split(ARG_SPLIT_CHAR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
          self
            .cmake_groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, c)| c)
            .ok_or_else(|| ProjectError::UnknownName {
              kind: "cmake group",
              name: name.to_string(),
            })
        })
        .collect::<Result<_, _>>()?,
    };

    let mut ids = Vec::new();
    for group in selected {
      ids.extend(group.select(builds)?);
    }
    Ok(ids)
  }

  /// Apply `flags` to each job, then resolve them in order.
  pub fn resolve(
    &mut self,
    ids: &[JobId],
    session: &mut Session,
    skip_dependencies: bool,
    flags: &JobFlags,
  ) -> Result<(), ResolveError> {
    for id in ids {
      self.graph.apply_flags(*id, flags);
      self.graph.resolve(*id, session, skip_dependencies)?;
    }
    Ok(())
  }
}

/// Query the git remote of `dir`, used as a package's website.
pub fn website_url_from_git(dir: &Path) -> Option<String> {
  let output = Command::new("git")
    .args(["config", "--get", "remote.origin.url"])
    .current_dir(dir)
    .output()
    .ok()?;
  if !output.status.success() {
    debug!(dir = %dir.display(), "no git remote found");
    return None;
  }
  let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
  (!url.is_empty()).then_some(url)
}

/// A job waiting for its references to be wired.
struct Pending {
  id: JobId,
  job: String,
  depends_on: Vec<String>,
}

struct Loader {
  root: PathBuf,
  host: Host,
  nrm_path_fix: bool,
  graph: JobGraph,
  pending: Vec<Pending>,
  downloads: Collection,
  download_paths: BTreeMap<String, PathBuf>,
  extractions: Collection,
  makefiles: Collection,
  mod_tomls: Collection,
  mod_toml_jobs: BTreeMap<String, ModTomlJob>,
  cmake_projects: BTreeMap<String, Rc<CMakeProjectConfig>>,
  cmake_groups: Vec<(String, Collection)>,
  build_outputs: Collection,
  thunderstore_packages: Collection,
  manifests: BTreeMap<String, PackageManifest>,
}

impl Loader {
  fn new(root: PathBuf, host: Host, nrm_path_fix: bool) -> Self {
    Self {
      root,
      host,
      nrm_path_fix,
      graph: JobGraph::new(),
      pending: Vec::new(),
      downloads: Collection::new("download"),
      download_paths: BTreeMap::new(),
      extractions: Collection::new("extract"),
      makefiles: Collection::new("makefile"),
      mod_tomls: Collection::new("nrm"),
      mod_toml_jobs: BTreeMap::new(),
      cmake_projects: BTreeMap::new(),
      cmake_groups: Vec::new(),
      build_outputs: Collection::new("build"),
      thunderstore_packages: Collection::new("thunderstore"),
      manifests: BTreeMap::new(),
    }
  }

  fn path(&self, p: &Path) -> PathBuf {
    self.root.join(p)
  }

  fn applies(&self, common: &CommonDef) -> bool {
    platform::matches_host(&common.platforms, &common.archs, self.host)
  }

  fn load(mut self, file: ProjectFile) -> Result<Project, ProjectError> {
    for def in file.downloads {
      if !self.applies(&def.common) {
        continue;
      }
      let job = match (&def.path, &def.dir) {
        (Some(path), _) => DownloadJob::to_path(&def.url, self.path(path)),
        (None, Some(dir)) => DownloadJob::into_dir(&def.url, self.path(dir)),
        (None, None) => DownloadJob::into_dir(&def.url, &self.root),
      };
      let job = match &def.sha256 {
        Some(sha) => job.with_sha256(sha),
        None => job,
      };
      self.download_paths.insert(def.name.clone(), job.download_path().to_path_buf());
      let id = self.add("download", &def.name, job, def.common, &[])?;
      self.downloads.insert(&def.name, id)?;
    }

    for def in file.extractions {
      if !self.applies(&def.common) {
        continue;
      }
      let (archive, implied) = match (&def.archive, &def.download) {
        (Some(archive), _) => (self.path(archive), Vec::new()),
        (None, Some(download)) => {
          let archive = self
            .download_paths
            .get(download)
            .cloned()
            .ok_or_else(|| ProjectError::UnknownName {
              kind: "download",
              name: download.clone(),
            })?;
          (archive, vec![format!("download:{download}")])
        }
        (None, None) => return Err(ProjectError::MissingArchive { name: def.name }),
      };
      let job = ArchiveExtractJob::new(archive, self.path(&def.dest));
      let id = self.add("extract", &def.name, job, def.common, &implied)?;
      self.extractions.insert(&def.name, id)?;
    }

    for def in file.makefiles {
      if !self.applies(&def.common) {
        continue;
      }
      let mut job = MakefileJob::new(self.path(&def.makefile), def.env).with_working_dir(&self.root);
      if let Some(make) = &def.make {
        job = job.with_make_binary(make);
      }
      let id = self.add("makefile", &def.name, job, def.common, &[])?;
      self.makefiles.insert(&def.name, id)?;
    }

    for def in file.cmake_projects {
      let mut config = CMakeProjectConfig::new(self.path(&def.working_dir), def.env);
      if let Some(cmake) = &def.cmake {
        config = config.with_cmake_binary(cmake);
      }
      if self.cmake_projects.insert(def.name.clone(), Rc::new(config)).is_some() {
        return Err(ProjectError::DuplicateName {
          kind: "cmake project",
          name: def.name,
        });
      }
    }

    for def in file.cmake_builds {
      if !self.applies(&def.common) {
        continue;
      }
      self.add_cmake_build(def)?;
    }

    for def in file.mod_tomls {
      if !self.applies(&def.common) {
        continue;
      }
      let build_dir = def.build_dir.as_ref().map(|dir| self.path(dir));
      let job = ModTomlJob::new(self.path(&def.tool), self.path(&def.toml), build_dir)?.with_path_fix(self.nrm_path_fix);
      self.mod_toml_jobs.insert(def.name.clone(), job.clone());
      let id = self.add("nrm", &def.name, job, def.common, &[])?;
      self.mod_tomls.insert(&def.name, id)?;
    }

    for def in file.build_outputs {
      if !self.applies(&def.common) {
        continue;
      }
      let job = BuildOutputJob::new(self.path(&def.path));
      let id = self.add("build", &def.name, job, def.common, &[])?;
      self.build_outputs.insert(&def.name, id)?;
    }

    for def in file.thunderstore_packages {
      if !self.applies(&def.common) {
        continue;
      }
      self.add_thunderstore_package(def)?;
    }

    self.wire()?;

    Ok(Project {
      root: self.root,
      graph: self.graph,
      downloads: self.downloads,
      extractions: self.extractions,
      makefiles: self.makefiles,
      mod_tomls: self.mod_tomls,
      cmake_groups: self.cmake_groups,
      build_outputs: self.build_outputs,
      thunderstore_packages: self.thunderstore_packages,
      manifests: self.manifests,
      clean_paths: file.project.clean_paths,
      distclean_paths: file.project.distclean_paths,
      nrm_path_fix_by_default: self.nrm_path_fix,
    })
  }

  fn add_cmake_build(&mut self, def: CMakeBuildDef) -> Result<(), ProjectError> {
    let build = format!("{}/{}", def.group, def.name);
    let project = self
      .cmake_projects
      .get(&def.project)
      .cloned()
      .ok_or_else(|| ProjectError::UnknownCMakeProject {
        build: build.clone(),
        project: def.project.clone(),
      })?;

    // Outputs are part of the job itself, not extra entries.
    let outputs = self.outputs(&def.common);
    let job = match (&def.preset, def.config_args, def.build_args) {
      (Some(preset), _, _) => CMakeBuildJob::from_preset_pair(project, outputs, preset, def.build_preset.as_deref()),
      (None, Some(config_args), Some(build_args)) => CMakeBuildJob::new(project, config_args, build_args, outputs),
      _ => return Err(ProjectError::MissingCMakeArgs { build }),
    };

    let common = CommonDef {
      outputs: BTreeMap::new(),
      ..def.common
    };
    let id = self.add("cmake", &build, job, common, &[])?;

    let index = match self.cmake_groups.iter().position(|(group, _)| *group == def.group) {
      Some(index) => index,
      None => {
        self.cmake_groups.push((def.group.clone(), Collection::new("cmake build")));
        self.cmake_groups.len() - 1
      }
    };
    self.cmake_groups[index].1.insert(&def.name, id)
  }

  fn add_thunderstore_package(&mut self, def: ThunderstoreDef) -> Result<(), ProjectError> {
    let manifest = match (def.manifest, &def.manifest_from) {
      (Some(manifest), _) => manifest,
      (None, Some(from)) => {
        let mod_toml = self.mod_toml_jobs.get(from).ok_or_else(|| ProjectError::UnknownName {
          kind: "nrm",
          name: from.clone(),
        })?;
        let website_url = def.website_url.clone().or_else(|| website_url_from_git(&self.root));
        let mut manifest = PackageManifest::from_mod_toml(mod_toml.toml_path(), mod_toml.data(), website_url)?;
        manifest.dependencies = def.dependencies.clone();
        manifest
      }
      (None, None) => return Err(ProjectError::MissingManifest { name: def.name }),
    };

    let read = |p: &Path| {
      let path = self.path(p);
      fs::read_to_string(&path).map_err(|source| ProjectError::Read { path, source })
    };
    let readme = read(&def.readme)?;
    let changelog = read(&def.changelog)?;

    let job = ThunderstorePackageJob::new(
      self.path(&def.file),
      manifest.clone(),
      readme,
      changelog,
      self.path(&def.icon),
    );
    let id = self.add("thunderstore", &def.name, job, def.common, &[])?;
    self.thunderstore_packages.insert(&def.name, id)?;
    self.manifests.insert(def.name, manifest);
    Ok(())
  }

  fn outputs(&self, common: &CommonDef) -> OutputMap {
    common
      .outputs
      .iter()
      .map(|(dst, src)| (PathBuf::from(dst), self.path(src)))
      .collect()
  }

  /// Add a job named `KIND:NAME`, record its references for wiring.
  fn add(
    &mut self,
    kind: &str,
    name: &str,
    job: impl Job + 'static,
    common: CommonDef,
    implied: &[String],
  ) -> Result<JobId, ProjectError> {
    let job_name = format!("{kind}:{name}");
    let outputs = self.outputs(&common);
    let id = self.graph.add(job_name.clone(), job);
    self
      .graph
      .add_outputs(id, outputs)
      .set_allow_re_resolution(id, common.allow_re_resolution);

    let mut depends_on = implied.to_vec();
    depends_on.extend(common.depends_on);
    self.pending.push(Pending {
      id,
      job: job_name,
      depends_on,
    });
    Ok(id)
  }

  fn wire(&mut self) -> Result<(), ProjectError> {
    let pending = std::mem::take(&mut self.pending);
    for entry in pending {
      let mut dependencies = Vec::with_capacity(entry.depends_on.len());
      for reference in &entry.depends_on {
        dependencies.push(self.lookup(&entry.job, reference)?);
      }
      debug!(job = %entry.job, count = dependencies.len(), "wired dependencies");
      self.graph.declare_dependencies(entry.id, dependencies);
    }
    Ok(())
  }

  fn lookup(&self, job: &str, reference: &str) -> Result<JobId, ProjectError> {
    let invalid = || ProjectError::InvalidReference {
      job: job.to_string(),
      reference: reference.to_string(),
    };
    let unknown = || ProjectError::UnknownReference {
      job: job.to_string(),
      reference: reference.to_string(),
    };

    let (kind, name) = reference.split_once(':').ok_or_else(invalid)?;
    let collection = match kind {
      "download" => &self.downloads,
      "extract" => &self.extractions,
      "makefile" => &self.makefiles,
      "nrm" => &self.mod_tomls,
      "build" => &self.build_outputs,
      "thunderstore" => &self.thunderstore_packages,
      "cmake" => {
        let (group, build) = name.split_once('/').ok_or_else(invalid)?;
        return self
          .cmake_groups
          .iter()
          .find(|(g, _)| g == group)
          .and_then(|(_, c)| c.get(build))
          .ok_or_else(unknown);
      }
      _ => return Err(invalid()),
    };
    collection.get(name).ok_or_else(unknown)
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;
  use crate::platform::{Arch, Os};

  fn load(content: &str, dir: &Path) -> Result<Project, ProjectError> {
    Project::from_toml_str(content, dir, Host::new(Os::Linux, Arch::X86_64))
  }

  #[test]
  fn collections_keep_declaration_order() {
    let temp = TempDir::new().unwrap();
    let project = load(
      r#"
[[build_outputs]]
name = "zeta"
path = "out/zeta"

[[build_outputs]]
name = "alpha"
path = "out/alpha"
"#,
      temp.path(),
    )
    .unwrap();

    assert_eq!(project.build_outputs().names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    assert_eq!(project.graph().node(project.build_outputs().get("zeta").unwrap()).name(), "build:zeta");
  }

  #[test]
  fn select_by_comma_list_and_unknown_name() {
    let temp = TempDir::new().unwrap();
    let project = load(
      r#"
[[build_outputs]]
name = "a"
path = "a"

[[build_outputs]]
name = "b"
path = "b"
"#,
      temp.path(),
    )
    .unwrap();
    let outputs = project.build_outputs();

    assert_eq!(outputs.select(None).unwrap().len(), 2);
    assert_eq!(
      outputs.select(Some("b,a")).unwrap(),
      vec![outputs.get("b").unwrap(), outputs.get("a").unwrap()]
    );
    let err = outputs.select(Some("a,nope")).unwrap_err();
    assert_eq!(err.to_string(), "unknown build name 'nope'");
  }

  #[test]
  fn references_are_wired_in_any_order() {
    let temp = TempDir::new().unwrap();
    let project = load(
      r#"
[[build_outputs]]
name = "debug"
path = "out"
depends_on = ["makefile:mod", "download:sdk"]

[[makefiles]]
name = "mod"
makefile = "mod.mk"

[[downloads]]
name = "sdk"
url = "https://example.com/sdk.zip"
dir = "downloads"
"#,
      temp.path(),
    )
    .unwrap();

    let out = project.build_outputs().get("debug").unwrap();
    let deps = project.graph().node(out).dependencies();
    assert_eq!(
      deps,
      &[project.makefiles().get("mod").unwrap(), project.downloads().get("sdk").unwrap()]
    );
  }

  #[test]
  fn extraction_of_a_download_depends_on_it() {
    let temp = TempDir::new().unwrap();
    let project = load(
      r#"
[[downloads]]
name = "tools"
url = "https://example.com/releases/tools-1.0.zip?raw=1"
dir = "downloads"

[[extractions]]
name = "tools"
download = "tools"
dest = "binaries/tools"
"#,
      temp.path(),
    )
    .unwrap();

    let extract = project.extractions().get("tools").unwrap();
    assert_eq!(
      project.graph().node(extract).dependencies(),
      &[project.downloads().get("tools").unwrap()]
    );
  }

  #[test]
  fn platform_filter_allows_one_name_per_platform() {
    let temp = TempDir::new().unwrap();
    let content = r#"
[[downloads]]
name = "tools"
url = "https://example.com/tools-linux.tar.gz"
platforms = ["linux"]

[[downloads]]
name = "tools"
url = "https://example.com/tools-darwin.tar.gz"
platforms = ["darwin"]
"#;

    let linux = Project::from_toml_str(content, temp.path(), Host::new(Os::Linux, Arch::X86_64)).unwrap();
    assert_eq!(linux.downloads().len(), 1);
    assert_eq!(linux.graph().len(), 1);

    let windows = Project::from_toml_str(content, temp.path(), Host::new(Os::Windows, Arch::X86_64)).unwrap();
    assert!(windows.downloads().is_empty());
  }

  #[test]
  fn arch_filter_picks_the_matching_toolchain() {
    let temp = TempDir::new().unwrap();
    let content = r#"
[[downloads]]
name = "toolchain"
url = "https://example.com/toolchain-Darwin-arm64.tar.xz"
dir = "downloads"
platforms = ["darwin"]
archs = ["arm64"]
outputs = { "toolchain" = "darwin-arm64" }

[[downloads]]
name = "toolchain"
url = "https://example.com/toolchain-Darwin-x86_64.tar.xz"
dir = "downloads"
platforms = ["darwin"]
archs = ["x86_64"]
outputs = { "toolchain" = "darwin-x86_64" }

[[downloads]]
name = "toolchain"
url = "https://example.com/toolchain-Linux-x86_64.tar.xz"
dir = "downloads"
platforms = ["linux"]
outputs = { "toolchain" = "linux" }
"#;
    let picked = |host: Host| {
      let project = Project::from_toml_str(content, temp.path(), host).unwrap();
      let id = project.downloads().get("toolchain")?;
      let target = project.graph().node(id).outputs().get(Path::new("toolchain"))?;
      target.file_name().map(|name| name.to_string_lossy().into_owned())
    };

    assert_eq!(picked(Host::new(Os::MacOs, Arch::Aarch64)).as_deref(), Some("darwin-arm64"));
    assert_eq!(picked(Host::new(Os::MacOs, Arch::X86_64)).as_deref(), Some("darwin-x86_64"));
    assert_eq!(picked(Host::new(Os::Linux, Arch::Aarch64)).as_deref(), Some("linux"));
    assert_eq!(picked(Host { os: Some(Os::MacOs), arch: None }), None);
  }

  #[test]
  fn unknown_arch_name_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let content = "[[downloads]]\nname = \"t\"\nurl = \"https://example.com/t.zip\"\narchs = [\"sparc\"]\n";
    assert!(matches!(load(content, temp.path()), Err(ProjectError::Parse(_))));
  }

  #[test]
  fn structural_errors_are_reported() {
    let temp = TempDir::new().unwrap();

    let dup = load(
      "[[makefiles]]\nname = \"m\"\nmakefile = \"a.mk\"\n\n[[makefiles]]\nname = \"m\"\nmakefile = \"b.mk\"\n",
      temp.path(),
    );
    assert!(matches!(dup, Err(ProjectError::DuplicateName { kind: "makefile", .. })));

    let unknown = load(
      "[[build_outputs]]\nname = \"o\"\npath = \"o\"\ndepends_on = [\"nrm:missing\"]\n",
      temp.path(),
    );
    assert!(matches!(unknown, Err(ProjectError::UnknownReference { .. })));

    let invalid = load(
      "[[build_outputs]]\nname = \"o\"\npath = \"o\"\ndepends_on = [\"nonsense\"]\n",
      temp.path(),
    );
    assert!(matches!(invalid, Err(ProjectError::InvalidReference { .. })));

    let no_project = load(
      "[[cmake_builds]]\ngroup = \"Debug\"\nname = \"lib\"\nproject = \"nope\"\npreset = \"debug\"\n",
      temp.path(),
    );
    assert!(matches!(no_project, Err(ProjectError::UnknownCMakeProject { .. })));

    let parse = load("[[downloads]\n", temp.path());
    assert!(matches!(parse, Err(ProjectError::Parse(_))));
  }

  #[test]
  fn cmake_groups_and_selection() {
    let temp = TempDir::new().unwrap();
    let project = load(
      r#"
[[cmake_projects]]
name = "extlib"
working_dir = "src/extlib"

[[cmake_builds]]
group = "Debug"
name = "linux"
project = "extlib"
preset = "linux-debug"
outputs = { "extlib.so" = "build/debug/extlib.so" }

[[cmake_builds]]
group = "Release"
name = "linux"
project = "extlib"
preset = "linux-release"

[[build_outputs]]
name = "debug"
path = "out"
depends_on = ["cmake:Debug/linux"]
"#,
      temp.path(),
    )
    .unwrap();

    let groups: Vec<&str> = project.cmake_groups().iter().map(|(g, _)| g.as_str()).collect();
    assert_eq!(groups, vec!["Debug", "Release"]);
    assert_eq!(project.select_cmake(None, None).unwrap().len(), 2);
    assert_eq!(project.select_cmake(Some("Release"), Some("linux")).unwrap().len(), 1);
    assert!(project.select_cmake(Some("Nightly"), None).is_err());
    assert!(project.select_cmake(None, Some("windows")).is_err());

    let debug = project.select_cmake(Some("Debug"), None).unwrap()[0];
    assert_eq!(project.graph().node(debug).name(), "cmake:Debug/linux");
    assert_eq!(
      project.graph().node(debug).outputs().get(&PathBuf::from("extlib.so")),
      Some(&temp.path().join("build/debug/extlib.so"))
    );
  }

  #[test]
  fn thunderstore_manifest_from_mod_toml() {
    let temp = TempDir::new().unwrap();
    fs::write(
      temp.path().join("mod.toml"),
      "[manifest]\nid = \"my_mod\"\nversion = \"0.3.0\"\nshort_description = \"Short\"\n\n[inputs]\nelf_path = \"build/mod.elf\"\nmod_filename = \"my_mod\"\n",
    )
    .unwrap();
    fs::write(temp.path().join("README.md"), "readme").unwrap();
    fs::write(temp.path().join("CHANGELOG.md"), "changes").unwrap();

    let project = load(
      r#"
[[mod_tomls]]
name = "mod"
tool = "RecompModTool"
toml = "mod.toml"

[[thunderstore_packages]]
name = "package"
file = "my_mod.thunderstore.zip"
manifest_from = "mod"
website_url = "https://example.com/my_mod"
readme = "README.md"
changelog = "CHANGELOG.md"
icon = "thumb.png"
depends_on = ["nrm:mod"]
"#,
      temp.path(),
    )
    .unwrap();

    let manifest = project.manifest("package").unwrap();
    assert_eq!(manifest.name, "my_mod");
    assert_eq!(manifest.version_number, "0.3.0");
    assert_eq!(manifest.website_url.as_deref(), Some("https://example.com/my_mod"));

    let nrm = project.mod_tomls().get("mod").unwrap();
    assert!(project.graph().node(nrm).outputs().contains_key(&PathBuf::from("my_mod.nrm")));
  }

  #[test]
  fn clean_paths_are_rooted() {
    let temp = TempDir::new().unwrap();
    let project = load(
      "[project]\nroot = \"sub\"\nclean_paths = [\"build\"]\ndistclean_paths = [\"downloads\"]\n",
      temp.path(),
    )
    .unwrap();

    assert_eq!(project.root(), temp.path().join("sub"));
    assert_eq!(project.clean_paths(), vec![temp.path().join("sub/build")]);
    assert_eq!(project.distclean_paths(), vec![temp.path().join("sub/downloads")]);
  }

  #[test]
  fn load_reads_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("modbuild.toml");
    fs::write(&path, "[[build_outputs]]\nname = \"o\"\npath = \"o\"\n").unwrap();

    let project = Project::load(&path).unwrap();
    assert_eq!(project.build_outputs().len(), 1);

    let missing = Project::load(&temp.path().join("nope.toml")).unwrap_err();
    assert!(matches!(missing, ProjectError::Read { .. }));
  }

  #[test]
  #[serial_test::serial]
  fn website_url_is_none_without_git() {
    let temp = TempDir::new().unwrap();
    let empty_path = temp.path().join("bin");
    fs::create_dir(&empty_path).unwrap();

    temp_env::with_var("PATH", Some(&empty_path), || {
      assert_eq!(website_url_from_git(temp.path()), None);
    });
  }

  #[test]
  #[serial_test::serial]
  fn manifest_from_mod_toml_without_git_has_no_website() {
    let temp = TempDir::new().unwrap();
    fs::write(
      temp.path().join("mod.toml"),
      "[manifest]\nid = \"quiet_mod\"\nversion = \"1.0.0\"\nshort_description = \"Quiet\"\n\n[inputs]\nelf_path = \"build/mod.elf\"\nmod_filename = \"quiet_mod\"\n",
    )
    .unwrap();
    fs::write(temp.path().join("README.md"), "readme").unwrap();
    fs::write(temp.path().join("CHANGELOG.md"), "changes").unwrap();
    let empty_path = temp.path().join("bin");
    fs::create_dir(&empty_path).unwrap();

    let project = temp_env::with_var("PATH", Some(&empty_path), || {
      load(
        r#"
[[mod_tomls]]
name = "mod"
tool = "RecompModTool"
toml = "mod.toml"

[[thunderstore_packages]]
name = "package"
file = "quiet_mod.zip"
manifest_from = "mod"
readme = "README.md"
changelog = "CHANGELOG.md"
icon = "icon.png"
"#,
        temp.path(),
      )
    })
    .unwrap();

    let manifest = project.manifest("package").unwrap();
    assert_eq!(manifest.name, "quiet_mod");
    assert_eq!(manifest.website_url, None);
  }
}
