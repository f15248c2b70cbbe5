//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

use cibuild_lib::{BuildMode, BuildOptions};

/// cibuild - continuous integration build steps
#[derive(Debug, Parser)]
#[command(name = "cibuild", author, version, about, long_about = None)]
#[command(args_override_self = true)]
pub struct Cli {
  /// Target platform. One of Windows-x86, Windows-x64, Linux-x86, Linux-x64, Linux-ARM.
  #[arg(short = 't', long)]
  pub target: Option<String>,

  /// Specify a version to publish.
  #[arg(short = 'p', long)]
  pub publish_version: Option<String>,

  /// Build artifacts directory. Used to fetch dependencies.
  #[arg(short = 'a', long)]
  pub artifacts: Option<PathBuf>,

  /// Fetch dependencies, skip building.
  #[arg(short = 'f', long)]
  pub fetch_only: bool,

  /// Skip fetch dependencies.
  #[arg(short = 'F', long)]
  pub no_fetch: bool,

  /// Steps to run, comma separated. (all,default,fetch,configure,clean,build,tests,publish)
  #[arg(long, default_value = "default")]
  pub steps: String,

  /// Build the Release configuration (default).
  #[arg(long, overrides_with = "debug")]
  pub release: bool,

  /// Build the Debug configuration.
  #[arg(long, overrides_with = "release")]
  pub debug: bool,
}

impl Cli {
  pub fn mode(&self) -> BuildMode {
    if self.debug { BuildMode::Debug } else { BuildMode::Release }
  }

  pub fn into_options(self) -> BuildOptions {
    let mode = self.mode();
    BuildOptions {
      target: self.target,
      publish_version: self.publish_version,
      artifacts: self.artifacts,
      fetch_only: self.fetch_only,
      no_fetch: self.no_fetch,
      steps: self.steps,
      mode,
    }
  }
}
