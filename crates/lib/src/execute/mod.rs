//! External process execution.
//!
//! Steps never spawn processes themselves; they go through an [`Executor`] so
//! the pipeline can be driven against a recording executor in tests.

pub mod shell;
pub mod types;

pub use shell::SystemExecutor;
pub use types::{ExecuteError, FetchRequest, ShellInvocation};

/// The boundary between the pipeline and the outside world.
///
/// Both operations block until the external process has exited.
pub trait Executor {
  /// Run a command line through the platform shell.
  fn shell(&mut self, invocation: &ShellInvocation) -> Result<(), ExecuteError>;

  /// Fetch the project's build dependencies.
  fn fetch(&mut self, request: &FetchRequest) -> Result<(), ExecuteError>;
}
