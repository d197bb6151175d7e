//! Thunderstore package creation.
//!
//! A package is a zip archive holding the metadata files Thunderstore expects
//! next to every output collected from the package job's dependency graph.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::job::{Job, JobContext, JobError};

/// Contents of a package's `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
  pub name: String,
  pub version_number: String,
  pub website_url: Option<String>,
  pub description: String,
  #[serde(default)]
  pub dependencies: Vec<String>,
}

impl PackageManifest {
  /// Build a manifest from a mod TOML's `[manifest]` table.
  ///
  /// Uses `id` as the package name, `version` and `short_description`.
  pub fn from_mod_toml(toml_path: &Path, data: &toml::Table, website_url: Option<String>) -> Result<Self, JobError> {
    let field = |key: &str| {
      data
        .get("manifest")
        .and_then(|m| m.get(key))
        .and_then(toml::Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| JobError::ModToml {
          path: toml_path.to_path_buf(),
          message: format!("missing string key manifest.{key}"),
        })
    };

    Ok(Self {
      name: field("id")?,
      version_number: field("version")?,
      website_url,
      description: field("short_description")?,
      dependencies: Vec::new(),
    })
  }

  /// Serialize as pretty JSON with a four-space indent.
  pub fn to_json(&self) -> Result<String, JobError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    self.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
  }

  /// Write `manifest.json` contents to `path`, creating parent directories.
  pub fn write(&self, path: &Path) -> Result<(), JobError> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, self.to_json()?)?;
    Ok(())
  }
}

#[derive(Debug, Clone)]
pub struct ThunderstorePackageJob {
  package_file: PathBuf,
  manifest: PackageManifest,
  readme: String,
  changelog: String,
  icon_file: PathBuf,
}

impl ThunderstorePackageJob {
  pub fn new(
    package_file: impl Into<PathBuf>,
    manifest: PackageManifest,
    readme: impl Into<String>,
    changelog: impl Into<String>,
    icon_file: impl Into<PathBuf>,
  ) -> Self {
    Self {
      package_file: package_file.into(),
      manifest,
      readme: readme.into(),
      changelog: changelog.into(),
      icon_file: icon_file.into(),
    }
  }

  pub fn package_file(&self) -> &Path {
    &self.package_file
  }

  pub fn manifest(&self) -> &PackageManifest {
    &self.manifest
  }

  /// Write only `manifest.json` to `path`. Nothing is resolved.
  pub fn write_manifest(&self, path: &Path) -> Result<(), JobError> {
    self.manifest.write(path)
  }
}

impl Job for ThunderstorePackageJob {
  fn label(&self) -> String {
    format!("Thunderstore Package Job: {}", self.manifest.name)
  }

  fn run(&mut self, ctx: &mut JobContext<'_>) -> Result<(), JobError> {
    info!(package = %self.manifest.name, file = %self.package_file.display(), "Thunderstore Package Job");

    let archive_error = |e: zip::result::ZipError| JobError::Archive {
      path: self.package_file.clone(),
      message: e.to_string(),
    };
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    if let Some(parent) = self.package_file.parent() {
      fs::create_dir_all(parent)?;
    }
    let mut zip = zip::ZipWriter::new(File::create(&self.package_file)?);

    let metadata = [
      ("manifest.json", self.manifest.to_json()?.into_bytes()),
      ("README.md", self.readme.clone().into_bytes()),
      ("CHANGELOG.md", self.changelog.clone().into_bytes()),
      ("icon.png", fs::read(&self.icon_file)?),
    ];
    for (name, contents) in metadata {
      zip.start_file(name, options).map_err(archive_error)?;
      zip.write_all(&contents)?;
    }

    for (dst, src) in ctx.recursive_outputs(true) {
      info!("Adding '{}' as '{}'...", src.display(), dst.display());
      let name = entry_name(&dst).ok_or_else(|| JobError::Archive {
        path: self.package_file.clone(),
        message: format!("cannot store '{}' in a package", dst.display()),
      })?;
      zip.start_file(name, options).map_err(archive_error)?;
      zip.write_all(&fs::read(&src)?)?;
    }

    zip.finish().map_err(archive_error)?;
    Ok(())
  }
}

/// Archive entry name for an output destination, with `/` separators.
///
/// Root and drive prefixes are dropped so absolute destinations land at the
/// top of the archive. `None` if the path climbs out with `..` or is empty.
fn entry_name(dst: &Path) -> Option<String> {
  let mut parts = Vec::new();
  for component in dst.components() {
    match component {
      Component::Normal(part) => parts.push(part.to_string_lossy().replace('\\', "/")),
      Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
      Component::ParentDir => return None,
    }
  }
  (!parts.is_empty()).then(|| parts.join("/"))
}
