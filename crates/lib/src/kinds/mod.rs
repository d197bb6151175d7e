//! Concrete job kinds.
//!
//! Each kind implements [`crate::job::Job`]. Kinds that start external
//! programs go through [`process::ExternalCommand`].

pub mod build_output;
pub mod cmake;
pub mod download;
pub mod extract;
pub mod makefile;
pub mod mod_toml;
pub mod package;
pub mod process;

pub use build_output::BuildOutputJob;
pub use cmake::{CMakeBuildJob, CMakeProjectConfig};
pub use download::DownloadJob;
pub use extract::ArchiveExtractJob;
pub use makefile::MakefileJob;
pub use mod_toml::ModTomlJob;
pub use package::{PackageManifest, ThunderstorePackageJob};
pub use process::{CommandOutcome, ExternalCommand};
