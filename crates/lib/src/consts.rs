/// Name of the application, used in user-facing text.
pub const APP_NAME: &str = "modbuild";

/// Project file looked up in the working directory when none is given.
pub const DEFAULT_PROJECT_FILE: &str = "modbuild.toml";

/// Environment variable that overrides the project file path.
pub const PROJECT_ENV_VAR: &str = "MODBUILD_PROJECT";

/// Separator for name lists given on the command line (`--name a,b`).
pub const ARG_SPLIT_CHAR: char = ',';
