use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// CPU architectures a project entry can be restricted to.
///
/// Toolchain archives are usually published per OS and architecture, so a
/// download entry can name both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Arch {
  X86_64,
  Aarch64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown architecture '{0}' (expected x86_64 or aarch64)")]
pub struct UnknownArch(pub String);

impl Arch {
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::X86_64),
      "aarch64" => Some(Self::Aarch64),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
    }
  }
}

impl FromStr for Arch {
  type Err = UnknownArch;

  /// Accepts the vendor spellings seen in release file names too.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "x86_64" | "amd64" | "x64" => Ok(Self::X86_64),
      "aarch64" | "arm64" => Ok(Self::Aarch64),
      _ => Err(UnknownArch(s.to_string())),
    }
  }
}

impl TryFrom<String> for Arch {
  type Error = UnknownArch;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
