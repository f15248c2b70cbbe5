//! Test utilities for cibuild-lib.
//!
//! [`RecordingExecutor`] stands in for real processes: it records every
//! invocation and can be told to fail on a given command.

use crate::execute::{ExecuteError, Executor, FetchRequest, ShellInvocation};

#[derive(Debug, Default)]
pub struct RecordingExecutor {
  pub invocations: Vec<ShellInvocation>,
  pub fetches: Vec<FetchRequest>,
  fail_on: Option<(String, i32)>,
  fail_fetch: bool,
}

impl RecordingExecutor {
  /// Fail any command containing `needle` with the given exit code.
  pub fn fail_on(mut self, needle: &str, code: i32) -> Self {
    self.fail_on = Some((needle.to_string(), code));
    self
  }

  /// Fail every fetch.
  pub fn fail_fetch(mut self) -> Self {
    self.fail_fetch = true;
    self
  }

  pub fn commands(&self) -> Vec<String> {
    self.invocations.iter().map(|i| i.command.clone()).collect()
  }
}

impl Executor for RecordingExecutor {
  fn shell(&mut self, invocation: &ShellInvocation) -> Result<(), ExecuteError> {
    self.invocations.push(invocation.clone());
    match &self.fail_on {
      Some((needle, code)) if invocation.command.contains(needle.as_str()) => Err(ExecuteError::CmdFailed {
        cmd: invocation.command.clone(),
        code: Some(*code),
      }),
      _ => Ok(()),
    }
  }

  fn fetch(&mut self, request: &FetchRequest) -> Result<(), ExecuteError> {
    self.fetches.push(request.clone());
    if self.fail_fetch {
      return Err(ExecuteError::FetchFailed {
        message: "dependency not available".to_string(),
      });
    }
    Ok(())
  }
}
