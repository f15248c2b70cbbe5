//! The mutable state threaded through every pipeline step.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::step::ActiveSteps;

/// Build configuration selected by `--release` / `--debug`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BuildMode {
  #[default]
  Release,
  Debug,
}

impl BuildMode {
  /// Lowercase name (`release`, `debug`).
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Release => "release",
      Self::Debug => "debug",
    }
  }

  /// Title-case name used as the MSBuild configuration (`Release`, `Debug`).
  pub fn title(&self) -> &'static str {
    match self {
      Self::Release => "Release",
      Self::Debug => "Debug",
    }
  }
}

impl fmt::Display for BuildMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Parsed command-line options for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
  /// Explicit target platform, e.g. `Linux-x64`.
  pub target: Option<String>,
  /// Version to publish. Presence enables the `publish` step.
  pub publish_version: Option<String>,
  /// Build artifacts directory handed to the dependency fetcher.
  pub artifacts: Option<PathBuf>,
  /// Only fetch dependencies.
  pub fetch_only: bool,
  /// Skip fetching dependencies.
  pub no_fetch: bool,
  /// Comma separated step selection.
  pub steps: String,
  pub mode: BuildMode,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      target: None,
      publish_version: None,
      artifacts: None,
      fetch_only: false,
      no_fetch: false,
      steps: "default".to_string(),
      mode: BuildMode::default(),
    }
  }
}

/// Key/value environment plus the options and step selection for one run.
///
/// Created once per process, owned by the runner and lent mutably to each step.
#[derive(Debug, Clone)]
pub struct Context {
  pub options: BuildOptions,
  pub env: BTreeMap<String, Value>,
  pub steps: ActiveSteps,
  pub project_dir: PathBuf,
}

impl Context {
  /// Create a context with an empty environment.
  pub fn new(options: BuildOptions, project_dir: impl Into<PathBuf>) -> Self {
    Self {
      options,
      env: BTreeMap::new(),
      steps: ActiveSteps::default(),
      project_dir: project_dir.into(),
    }
  }

  /// Create a context seeded with the given environment variables.
  pub fn with_env<I, K, V>(options: BuildOptions, project_dir: impl Into<PathBuf>, vars: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    let mut ctx = Self::new(options, project_dir);
    for (key, value) in vars {
      let value: String = value.into();
      ctx.set(key, value);
    }
    ctx
  }

  /// Create a context seeded from the process environment.
  ///
  /// Variables whose name or value is not valid Unicode are skipped.
  pub fn from_process_env(options: BuildOptions, project_dir: impl Into<PathBuf>) -> Self {
    Self::with_env(options, project_dir, unicode_vars(std::env::vars_os()))
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.env.get(key)
  }

  /// String value for `key`, or `None` if missing or structured.
  pub fn get_str(&self, key: &str) -> Option<&str> {
    self.env.get(key).and_then(Value::as_str)
  }

  pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
    self.env.insert(key.into(), value.into());
  }

  /// Whether `key` holds the string `true`, ignoring case.
  pub fn is_truthy(&self, key: &str) -> bool {
    self.get_str(key).is_some_and(|v| v.eq_ignore_ascii_case("true"))
  }

  /// String-valued entries, suitable as a child process environment.
  ///
  /// Structured values (such as the build info document) are not exported.
  pub fn string_vars(&self) -> BTreeMap<String, String> {
    self
      .env
      .iter()
      .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
      .collect()
  }

  /// Resolve a project-relative path.
  pub fn project_path(&self, relative: impl AsRef<Path>) -> PathBuf {
    self.project_dir.join(relative)
  }
}

fn unicode_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Vec<(String, String)> {
  vars
    .into_iter()
    .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
      (Ok(key), Ok(value)) => Some((key, value)),
      (key, _) => {
        debug!(key = ?key, "skipping environment variable that is not valid unicode");
        None
      }
    })
    .collect()
}
