//! Host platform detection.
//!
//! Project entries can be limited to some operating systems and CPU
//! architectures; the `info` command prints the host triple.

pub mod arch;
pub mod os;

use std::fmt;

pub use arch::{Arch, UnknownArch};
pub use os::{Os, UnknownOs};

/// Architecture and OS pair (e.g. "aarch64-darwin").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the host platform. `None` on unsupported hosts.
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

/// The machine a project is loaded for. Either half may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Host {
  pub os: Option<Os>,
  pub arch: Option<Arch>,
}

impl Host {
  pub fn new(os: Os, arch: Arch) -> Self {
    Self {
      os: Some(os),
      arch: Some(arch),
    }
  }

  pub fn current() -> Self {
    Self {
      os: Os::current(),
      arch: Arch::current(),
    }
  }
}

/// Whether an entry restricted to `platforms` and `archs` applies on `host`.
///
/// An empty list places no restriction. An unknown host OS or architecture
/// only matches entries that do not restrict it.
pub fn matches_host(platforms: &[Os], archs: &[Arch], host: Host) -> bool {
  let os_ok = platforms.is_empty() || host.os.is_some_and(|os| platforms.contains(&os));
  let arch_ok = archs.is_empty() || host.arch.is_some_and(|arch| archs.contains(&arch));
  os_ok && arch_ok
}
