//! Package a mod with the mod tool, driven by its `.toml` description.
//!
//! The TOML is read when the job is constructed, so its contents are available
//! to the project file (for example to derive a package manifest) before
//! anything runs.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;

use super::process::ExternalCommand;
use crate::job::{Job, JobContext, JobError, JobFlags, OutputMap};

#[derive(Debug, Clone)]
pub struct ModTomlJob {
  mod_tool: PathBuf,
  toml_path: PathBuf,
  build_dir: PathBuf,
  data: toml::Table,
  path_fix: bool,
}

impl ModTomlJob {
  /// Read `toml_path` and set up the job.
  ///
  /// Without a `build_dir`, the directory of `inputs.elf_path` is used.
  pub fn new(
    mod_tool: impl Into<PathBuf>,
    toml_path: impl Into<PathBuf>,
    build_dir: Option<PathBuf>,
  ) -> Result<Self, JobError> {
    let toml_path = toml_path.into();
    let content = fs::read_to_string(&toml_path).map_err(|e| JobError::ModToml {
      path: toml_path.clone(),
      message: e.to_string(),
    })?;
    let data: toml::Table = toml::from_str(&content).map_err(|e| JobError::ModToml {
      path: toml_path.clone(),
      message: e.to_string(),
    })?;

    let mut job = Self {
      mod_tool: mod_tool.into(),
      toml_path,
      build_dir: PathBuf::new(),
      data,
      path_fix: false,
    };
    // Both keys are needed for the declared output.
    job.input_str("mod_filename")?;
    job.build_dir = match build_dir {
      Some(dir) => dir,
      None => {
        let elf = job.elf_path()?;
        elf.parent().map(Path::to_path_buf).unwrap_or_default()
      }
    };
    Ok(job)
  }

  /// Rewrite the produced archive's entry separators after every run.
  pub fn with_path_fix(mut self, path_fix: bool) -> Self {
    self.path_fix = path_fix;
    self
  }

  pub fn toml_path(&self) -> &Path {
    &self.toml_path
  }

  pub fn build_dir(&self) -> &Path {
    &self.build_dir
  }

  /// The parsed mod TOML.
  pub fn data(&self) -> &toml::Table {
    &self.data
  }

  /// Resolve a path written in the TOML against the TOML's directory.
  pub fn path_from_toml(&self, rel_path: impl AsRef<Path>) -> PathBuf {
    let base = self.toml_path.parent().unwrap_or(Path::new(""));
    let joined = base.join(rel_path);
    dunce::canonicalize(&joined).unwrap_or(joined)
  }

  pub fn elf_path(&self) -> Result<PathBuf, JobError> {
    let rel = self.input_str("elf_path")?;
    Ok(self.path_from_toml(rel))
  }

  /// The `.nrm` file the mod tool writes into the build directory.
  pub fn output_path(&self) -> PathBuf {
    let filename = self.input_str("mod_filename").unwrap_or_default();
    self.build_dir.join(Path::new(filename).with_extension("nrm"))
  }

  fn input_str(&self, key: &str) -> Result<&str, JobError> {
    self
      .data
      .get("inputs")
      .and_then(|inputs| inputs.get(key))
      .and_then(toml::Value::as_str)
      .ok_or_else(|| JobError::ModToml {
        path: self.toml_path.clone(),
        message: format!("missing string key inputs.{key}"),
      })
  }
}

impl Job for ModTomlJob {
  fn label(&self) -> String {
    format!("Mod Toml Job: {}", self.toml_path.display())
  }

  fn declared_outputs(&self) -> OutputMap {
    let output = self.output_path();
    let mut outputs = OutputMap::new();
    if let Some(name) = output.file_name() {
      outputs.insert(PathBuf::from(name), output.clone());
    }
    outputs
  }

  fn run(&mut self, ctx: &mut JobContext<'_>) -> Result<(), JobError> {
    info!(toml = %self.toml_path.display(), "Mod Toml Job");
    ExternalCommand::new(&self.mod_tool)
      .arg(&self.toml_path)
      .arg(&self.build_dir)
      .run(ctx.config())?;

    if self.path_fix && !ctx.config().dry {
      fix_entry_separators(&self.output_path())?;
    }
    Ok(())
  }

  fn apply_flags(&mut self, flags: &JobFlags) {
    self.path_fix = flags.path_fix;
  }
}

/// Rewrite a zip archive in place so entry names use `/` instead of `\`.
///
/// Entries keep their compression method.
pub fn fix_entry_separators(archive_path: &Path) -> Result<(), JobError> {
  let archive_error = |e: zip::result::ZipError| JobError::Archive {
    path: archive_path.to_path_buf(),
    message: e.to_string(),
  };

  let temp_path = archive_path.with_extension("nrm_temp");
  {
    let mut input = zip::ZipArchive::new(BufReader::new(File::open(archive_path)?)).map_err(archive_error)?;
    let mut output = zip::ZipWriter::new(File::create(&temp_path)?);

    for i in 0..input.len() {
      let mut entry = input.by_index(i).map_err(archive_error)?;
      let name = entry.name().replace('\\', "/");
      debug!(from = %entry.name(), to = %name, "rewriting entry");

      let mut contents = Vec::new();
      entry.read_to_end(&mut contents)?;

      let options = SimpleFileOptions::default().compression_method(entry.compression());
      output.start_file(name, options).map_err(archive_error)?;
      output.write_all(&contents)?;
    }

    output.finish().map_err(archive_error)?;
  }

  fs::remove_file(archive_path)?;
  fs::rename(&temp_path, archive_path)?;
  Ok(())
}
