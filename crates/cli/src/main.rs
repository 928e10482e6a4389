mod cmd;
mod output;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use srcbuild_lib::consts::{APP_NAME, DEFAULT_MANIFEST};
use srcbuild_lib::manifest::CleanupPolicy;

use crate::cmd::{Overrides, cmd_plan, cmd_run};
use crate::output::{OutputFormat, print_error};

/// Fetch, build and install a chain of source dependencies into one prefix
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Build file describing the targets
  #[arg(short, long, default_value = DEFAULT_MANIFEST)]
  file: PathBuf,

  /// Parallel compile jobs (default: build file, then host CPU count)
  #[arg(short, long)]
  jobs: Option<NonZeroUsize>,

  /// When to remove the workspace: always, on-success or never
  #[arg(long)]
  cleanup: Option<CleanupPolicy>,

  /// Scratch directory for checkouts
  #[arg(long)]
  workspace: Option<PathBuf>,

  /// Print what would run, then exit without running anything
  #[arg(long)]
  plan: bool,

  /// Plan output format
  #[arg(long, value_enum, default_value_t)]
  output: OutputFormat,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,

  /// Options appended verbatim to every configure invocation
  #[arg(last = true, value_name = "CONFIGURE_ARGS")]
  configure_args: Vec<String>,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let overrides = Overrides {
    jobs: cli.jobs,
    cleanup: cli.cleanup,
    workspace: cli.workspace,
  };

  let result = if cli.plan {
    cmd_plan(&cli.file, &overrides, cli.configure_args, cli.output).map(|()| 0)
  } else {
    cmd_run(&cli.file, &overrides, cli.configure_args)
  };

  match result {
    Ok(code) => exit_status(code),
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}

/// Map a run's exit code onto a process status, keeping failures non-zero.
fn exit_status(code: i32) -> ExitCode {
  if code == 0 {
    return ExitCode::SUCCESS;
  }
  match u8::try_from(code) {
    Ok(code) => ExitCode::from(code),
    Err(_) => ExitCode::FAILURE,
  }
}
