mod args;
mod output;

use std::time::Instant;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cibuild_lib::consts::PLATFORM_KEY;
use cibuild_lib::{CiError, Context, RunSummary, SystemExecutor, config, pipeline};

use args::Cli;
use output::{format_duration, print_error, print_info, print_stat, print_success};

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cibuild=info,cibuild_lib=info")))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let cli = Cli::parse();

  if let Err(err) = run(cli) {
    print_error(&format!("{:#}", err));
    let code = err.downcast_ref::<CiError>().map(CiError::exit_code).unwrap_or(1);
    std::process::exit(code);
  }
}

fn run(cli: Cli) -> Result<()> {
  let started = Instant::now();
  let options = cli.into_options();
  debug!(?options, "parsed options");
  let project_dir = config::project_dir();

  print_info(&format!("Building in {}", project_dir.display()));

  let mut ctx = Context::from_process_env(options, project_dir);
  let mut exec = SystemExecutor::from_env().context("Failed to initialise process executor")?;

  let summary = pipeline::run(&mut ctx, &mut exec)?;
  print_summary(&ctx, &summary, started);

  Ok(())
}

fn print_summary(ctx: &Context, summary: &RunSummary, started: Instant) {
  println!();
  print_success(&format!(
    "{} step(s) completed in {}",
    summary.executed.len(),
    format_duration(started.elapsed())
  ));
  if let Some(platform) = ctx.get_str(PLATFORM_KEY) {
    print_stat("Platform", platform);
  }
  print_stat("Mode", ctx.options.mode.as_str());
  print_stat("Executed", &summary.executed.join(", "));
  if !summary.skipped.is_empty() {
    print_stat("Skipped", &summary.skipped.join(", "));
  }
}
