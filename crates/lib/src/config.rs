//! Environment-driven settings.
//!
//! Everything here has a sensible default; the variables exist so CI jobs and
//! tests can point the pipeline somewhere else without new flags.

use std::path::PathBuf;

use crate::consts::{DEFAULT_FETCH_CMD, FETCH_CMD_ENV, PROJECT_DIR_ENV, SHELL_ENV};

fn non_empty_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Returns the project root that relative paths resolve against.
///
/// `CIBUILD_PROJECT_DIR` if set, otherwise the current directory.
pub fn project_dir() -> PathBuf {
  let dir = non_empty_var(PROJECT_DIR_ENV)
    .map(PathBuf::from)
    .or_else(|| std::env::current_dir().ok())
    .unwrap_or_else(|| PathBuf::from("."));
  dunce::canonicalize(&dir).unwrap_or(dir)
}

/// Returns the command line used to fetch dependencies.
pub fn fetch_command() -> String {
  non_empty_var(FETCH_CMD_ENV).unwrap_or_else(|| DEFAULT_FETCH_CMD.to_string())
}

/// Returns the shell override for command execution, if any.
pub fn shell_override() -> Option<String> {
  non_empty_var(SHELL_ENV)
}
