mod clean;
mod cmake;
mod info;
mod jobs;
mod manifest;

pub use clean::{cmd_clean, cmd_distclean};
pub use cmake::cmd_cmake;
pub use info::cmd_info;
pub use jobs::{Phase, SelectArgs, cmd_jobs};
pub use manifest::cmd_manifest;
