//! Dry-run: print what a run would do.

use std::path::Path;

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};

use srcbuild_lib::execute::ProcessRunner;
use srcbuild_lib::fetch::GitFetcher;
use srcbuild_lib::orchestrator::{Orchestrator, PlannedStep};

use super::{Overrides, context_label, detect_context, load_manifest};
use crate::output::{OutputFormat, print_info, print_json};

pub fn cmd_plan(file: &Path, overrides: &Overrides, configure_args: Vec<String>, format: OutputFormat) -> Result<()> {
  let manifest = load_manifest(file, overrides)?;
  let context = detect_context()?;

  let runner = ProcessRunner::new();
  let fetcher = GitFetcher::new();
  let steps = Orchestrator::new(&manifest, context.clone(), &runner, &fetcher)
    .with_extra_options(configure_args)
    .plan();

  if format.is_json() {
    return print_json(&steps);
  }

  print_info(&format!(
    "Plan for {} target(s), {} context, {} job(s)",
    manifest.targets.len(),
    context_label(&context),
    manifest.settings.jobs
  ));
  for step in &steps {
    print_step(step);
  }

  Ok(())
}

fn print_step(step: &PlannedStep) {
  let phase = format!("{:<9}", step.phase);
  let target = step.target.as_deref().unwrap_or("-");
  match &step.command {
    Some(command) => println!(
      "  {} {:<20} {:<12} {}",
      phase.if_supports_color(Stream::Stdout, |s| s.cyan()),
      target,
      step.action,
      command
    ),
    None => println!(
      "  {} {:<20} {}",
      phase.if_supports_color(Stream::Stdout, |s| s.cyan()),
      target,
      step.action
    ),
  }
}
