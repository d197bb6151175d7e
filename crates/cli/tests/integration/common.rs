//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated project directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a project directory with `modbuild.toml` set to `content`.
  pub fn with_project(content: &str) -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("modbuild.toml", content);
    env
  }

  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap_or_else(|_| self.temp.path().to_path_buf())
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Write a file relative to the project directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Write a zip archive holding `entries` (name, contents).
  pub fn write_zip(&self, relative_path: &str, entries: &[(&str, &str)]) {
    use std::io::Write;

    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    for (name, contents) in entries {
      zip
        .start_file(*name, zip::write::SimpleFileOptions::default())
        .unwrap();
      zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
  }

  pub fn read(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.path(relative_path))
      .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative_path, e))
  }

  /// Get a Command for the modbuild binary running in the project directory.
  pub fn modbuild_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("modbuild");
    cmd.current_dir(self.temp.path());
    cmd.env_remove("MODBUILD_PROJECT");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

/// Entry names of a zip archive, sorted.
pub fn zip_names(path: &Path) -> Vec<String> {
  let zip = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
  let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
  names.sort();
  names
}
