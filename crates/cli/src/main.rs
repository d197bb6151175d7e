mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use modbuild_lib::consts::{DEFAULT_PROJECT_FILE, PROJECT_ENV_VAR};
use modbuild_lib::job::JobFlags;
use modbuild_lib::project::Project;
use modbuild_lib::session::{Session, SessionConfig};

use cmd::{Phase, SelectArgs};
use output::{OutputFormat, print_error};

/// Build N64 recomp mods: downloads, makefiles, CMake, mod packaging.
#[derive(Parser)]
#[command(name = "modbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project file describing the jobs
  #[arg(short, long, global = true, env = PROJECT_ENV_VAR, default_value = DEFAULT_PROJECT_FILE)]
  project: PathBuf,

  /// Print each external command before running it
  #[arg(long, global = true)]
  echo: bool,

  /// Keep going when an external command fails
  #[arg(long, global = true)]
  warn_only: bool,

  /// Do not start external commands
  #[arg(long, global = true)]
  dry: bool,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Download files; existing downloads are skipped
  Download {
    #[command(flatten)]
    select: SelectArgs,

    /// Download again even if the file exists
    #[arg(long)]
    force: bool,
  },

  /// Extract archives; existing destinations are skipped
  Extract {
    #[command(flatten)]
    select: SelectArgs,

    /// Extract again even if the destination exists
    #[arg(long)]
    force: bool,
  },

  /// Run makefiles
  Makefile {
    #[command(flatten)]
    select: SelectArgs,
  },

  /// Build .nrm files from mod .toml files
  Nrm {
    #[command(flatten)]
    select: SelectArgs,

    /// Rewrite backslashes in the produced .nrm archive (experimental)
    #[arg(long)]
    path_fix: bool,
  },

  /// Run CMake builds by group
  Cmake {
    /// List the groups and their builds, then exit
    #[arg(long)]
    list: bool,

    /// Do not resolve the builds' dependencies
    #[arg(long)]
    skip_dependencies: bool,

    /// Only run these groups (comma-separated)
    #[arg(long, value_name = "GROUPS")]
    group: Option<String>,

    /// Only run these builds within each selected group (comma-separated)
    #[arg(long, value_name = "BUILDS")]
    build: Option<String>,
  },

  /// Update build output folders (default)
  Build {
    #[command(flatten)]
    select: SelectArgs,

    /// Also copy outputs of dependencies not resolved in this run
    #[arg(long)]
    unresolved_jobs: bool,

    /// Also copy outputs of every job resolved in this run
    #[arg(long)]
    all_resolved_jobs: bool,
  },

  /// Write a Thunderstore package's manifest.json without building anything
  Manifest {
    /// List the package names, then exit
    #[arg(long)]
    list: bool,

    /// Only these packages (comma-separated)
    #[arg(long, value_name = "NAMES")]
    name: Option<String>,

    /// File to write (default: <package name>.json)
    #[arg(long)]
    output_file: Option<PathBuf>,
  },

  /// Create Thunderstore package archives
  Thunderstore {
    #[command(flatten)]
    select: SelectArgs,
  },

  /// Run download, extract, makefile, nrm, cmake, build and thunderstore
  All,

  /// Delete build folders
  Clean {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Clean, then delete downloads and extracted tools
  Distclean {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Display system information
  Info,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "info" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let command = cli.command.unwrap_or(Commands::Build {
    select: SelectArgs::default(),
    unresolved_jobs: false,
    all_resolved_jobs: false,
  });

  if let Commands::Info = command {
    cmd::cmd_info();
    return Ok(());
  }

  debug!(project = %cli.project.display(), "loading project");
  let mut project =
    Project::load(&cli.project).with_context(|| format!("Failed to load project {}", cli.project.display()))?;
  let mut session = Session::new(SessionConfig {
    echo: cli.echo,
    warn: cli.warn_only,
    dry: cli.dry,
  });
  let path_fix_default = project.nrm_path_fix_by_default();

  match command {
    Commands::Download { select, force } => {
      let flags = JobFlags {
        force,
        ..Default::default()
      };
      cmd::cmd_jobs(&mut project, &mut session, Phase::Download, &select, &flags)
    }
    Commands::Extract { select, force } => {
      let flags = JobFlags {
        force,
        ..Default::default()
      };
      cmd::cmd_jobs(&mut project, &mut session, Phase::Extract, &select, &flags)
    }
    Commands::Makefile { select } => {
      cmd::cmd_jobs(&mut project, &mut session, Phase::Makefile, &select, &JobFlags::default())
    }
    Commands::Nrm { select, path_fix } => {
      let flags = JobFlags {
        path_fix: path_fix || path_fix_default,
        ..Default::default()
      };
      cmd::cmd_jobs(&mut project, &mut session, Phase::Nrm, &select, &flags)
    }
    Commands::Cmake {
      list,
      skip_dependencies,
      group,
      build,
    } => cmd::cmd_cmake(
      &mut project,
      &mut session,
      list,
      skip_dependencies,
      group.as_deref(),
      build.as_deref(),
    ),
    Commands::Build {
      select,
      unresolved_jobs,
      all_resolved_jobs,
    } => {
      let flags = JobFlags {
        include_unresolved: unresolved_jobs,
        include_all_resolved: all_resolved_jobs,
        ..Default::default()
      };
      cmd::cmd_jobs(&mut project, &mut session, Phase::Build, &select, &flags)
    }
    Commands::Manifest {
      list,
      name,
      output_file,
    } => cmd::cmd_manifest(&project, list, name.as_deref(), output_file.as_deref()),
    Commands::Thunderstore { select } => {
      cmd::cmd_jobs(&mut project, &mut session, Phase::Thunderstore, &select, &JobFlags::default())
    }
    Commands::All => run_all(&mut project, &mut session, path_fix_default),
    Commands::Clean { output } => cmd::cmd_clean(&project, output),
    Commands::Distclean { output } => cmd::cmd_distclean(&project, output),
    // Printed before the project is loaded.
    Commands::Info => Ok(()),
  }
}

/// Every phase in order, sharing one session so nothing runs twice.
fn run_all(project: &mut Project, session: &mut Session, path_fix_default: bool) -> Result<()> {
  let select = SelectArgs::default();
  let defaults = JobFlags::default();
  let nrm_flags = JobFlags {
    path_fix: path_fix_default,
    ..Default::default()
  };

  cmd::cmd_jobs(project, session, Phase::Download, &select, &defaults)?;
  cmd::cmd_jobs(project, session, Phase::Extract, &select, &defaults)?;
  cmd::cmd_jobs(project, session, Phase::Makefile, &select, &defaults)?;
  cmd::cmd_jobs(project, session, Phase::Nrm, &select, &nrm_flags)?;
  cmd::cmd_cmake(project, session, false, false, None, None)?;
  cmd::cmd_jobs(project, session, Phase::Build, &select, &defaults)?;
  cmd::cmd_jobs(project, session, Phase::Thunderstore, &select, &defaults)
}
