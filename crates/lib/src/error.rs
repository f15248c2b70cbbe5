//! Error taxonomy for a pipeline run.
//!
//! Every variant aborts the run. There is no local recovery; the CLI maps the
//! error to the process exit status with [`CiError::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

use crate::execute::ExecuteError;

#[derive(Debug, Error)]
pub enum CiError {
  /// Invalid or missing configuration.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// A platform identifier was supplied but is not one we know how to build for.
  #[error(
    "configuration error: unknown platform '{0}' (expected one of Windows-x86, Windows-x64, Linux-x86, Linux-x64, Linux-ARM, Mac-x86, Mac-x64, Mac-ARM)"
  )]
  UnknownPlatform(String),

  /// Nothing was supplied and the host could not be mapped to a platform.
  #[error("configuration error: could not detect a platform for host {os}/{arch}, pass --target")]
  UndetectedPlatform { os: String, arch: String },

  /// An external tool the pipeline depends on is not installed.
  #[error("configuration error: required tool not found: {program}")]
  CollaboratorNotFound { program: String },

  /// The build info document could not be read or parsed.
  #[error("configuration error: failed to load build info from {}: {source}", path.display())]
  BuildInfo {
    path: PathBuf,
    #[source]
    source: BuildInfoError,
  },

  /// The external build tool exited unsuccessfully.
  #[error("build tool failed with exit code {code:?}: {cmd}")]
  BuildTool { cmd: String, code: Option<i32> },

  /// The dependency fetch collaborator reported a failure.
  #[error("dependency fetch failed: {0}")]
  DependencyFetch(String),
}

/// Why the build info document could not be loaded.
#[derive(Debug, Error)]
pub enum BuildInfoError {
  #[error("failed to read file: {0}")]
  Read(#[from] std::io::Error),

  #[error("invalid JSON: {0}")]
  Parse(#[from] serde_json::Error),
}

impl CiError {
  /// Whether this error belongs to the configuration class.
  pub fn is_configuration(&self) -> bool {
    matches!(
      self,
      CiError::Configuration(_)
        | CiError::UnknownPlatform(_)
        | CiError::UndetectedPlatform { .. }
        | CiError::CollaboratorNotFound { .. }
        | CiError::BuildInfo { .. }
    )
  }

  /// Process exit status for this error.
  ///
  /// A failing build tool passes its own exit code through. Everything else,
  /// including a tool killed by a signal, exits with 1.
  pub fn exit_code(&self) -> i32 {
    match self {
      CiError::BuildTool { code: Some(code), .. } if *code != 0 => *code,
      _ => 1,
    }
  }
}

impl From<ExecuteError> for CiError {
  fn from(err: ExecuteError) -> Self {
    match err {
      ExecuteError::CmdFailed { cmd, code } => CiError::BuildTool { cmd, code },
      ExecuteError::ToolNotFound { program } => CiError::CollaboratorNotFound { program },
      ExecuteError::FetchFailed { message } => CiError::DependencyFetch(message),
      ExecuteError::Io(e) => CiError::Configuration(format!("failed to run external process: {}", e)),
    }
  }
}
