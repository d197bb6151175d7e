use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Operating systems a project entry can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operating system '{0}' (expected linux, darwin or windows)")]
pub struct UnknownOs(pub String);

impl Os {
  /// Detect the host operating system.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Lowercase identifier used in project files and platform triples.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
    }
  }
}

impl FromStr for Os {
  type Err = UnknownOs;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "linux" => Ok(Self::Linux),
      "darwin" | "macos" => Ok(Self::MacOs),
      "windows" => Ok(Self::Windows),
      _ => Err(UnknownOs(s.to_string())),
    }
  }
}

impl TryFrom<String> for Os {
  type Error = UnknownOs;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
