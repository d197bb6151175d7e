//! modbuild-lib: dependency-aware build jobs for N64 recomp mods.
//!
//! - `job`: the job graph and its resolution engine
//! - `session`: per-invocation state shared by every resolve call
//! - `kinds`: concrete jobs (downloads, archives, make, CMake, mod tool, packaging)
//! - `project`: loading a project file into a job graph

pub mod clean;
pub mod consts;
pub mod job;
pub mod kinds;
pub mod platform;
pub mod project;
pub mod session;
