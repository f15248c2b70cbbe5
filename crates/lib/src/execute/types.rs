//! Types exchanged with an [`Executor`](super::Executor).

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::context::BuildMode;
use crate::platform::PlatformId;

/// Errors raised while running an external process.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// Command exited unsuccessfully.
  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  /// The program (or the shell itself) could not be found.
  #[error("program not found: {program}")]
  ToolNotFound { program: String },

  /// The dependency fetcher reported a failure.
  #[error("fetch failed: {message}")]
  FetchFailed { message: String },

  /// I/O error while spawning or waiting on the process.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// A command line to run through the platform shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInvocation {
  pub command: String,
  pub cwd: PathBuf,
  /// Complete environment for the child. Nothing is inherited.
  pub env: BTreeMap<String, String>,
}

/// Everything the dependency fetcher needs to know about this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
  pub platform: PlatformId,
  pub mode: BuildMode,
  pub artifacts: Option<PathBuf>,
  pub cwd: PathBuf,
  /// Complete environment for the fetcher, including `debugmode` and
  /// `titlecase-debugmode`.
  pub env: BTreeMap<String, String>,
}

impl FetchRequest {
  /// Command-line arguments appended to the fetch command.
  pub fn args(&self) -> Vec<String> {
    let mut args = vec!["--target".to_string(), self.platform.to_string()];
    if let Some(artifacts) = &self.artifacts {
      args.push("--artifacts".to_string());
      args.push(artifacts.display().to_string());
    }
    args
  }
}
