//! Process-spawning executor.
//!
//! Command lines run through the platform shell with a fully specified
//! environment. Output is streamed line by line as the child produces it, so
//! long MSBuild runs show progress in the CI console.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::runtime::Runtime;
use tracing::{debug, info, trace};

use crate::config;
use crate::execute::Executor;
use crate::execute::types::{ExecuteError, FetchRequest, ShellInvocation};

/// Exit status a shell reports when the program it was asked to run is missing.
#[cfg(unix)]
const NOT_FOUND_STATUS: i32 = 127;
#[cfg(windows)]
const NOT_FOUND_STATUS: i32 = 9009;

/// Executor that spawns real processes.
///
/// Owns a current-thread runtime; every call blocks on it until the child exits.
pub struct SystemExecutor {
  shell: Option<String>,
  fetch_command: String,
  runtime: Runtime,
}

impl SystemExecutor {
  pub fn new(shell: Option<String>, fetch_command: impl Into<String>) -> Result<Self, ExecuteError> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    Ok(Self {
      shell,
      fetch_command: fetch_command.into(),
      runtime,
    })
  }

  /// Executor configured from `CIBUILD_SHELL` and `CIBUILD_FETCH_CMD`.
  pub fn from_env() -> Result<Self, ExecuteError> {
    Self::new(config::shell_override(), config::fetch_command())
  }

  fn run(&self, cmd: &str, cwd: &Path, env: &BTreeMap<String, String>) -> Result<ExitStatus, ExecuteError> {
    let (shell_cmd, shell_args) = get_shell(self.shell.as_deref());
    debug!(shell = %shell_cmd, cwd = %cwd.display(), "spawning process");
    self
      .runtime
      .block_on(spawn_and_stream(&shell_cmd, &shell_args, cmd, cwd, env))
  }
}

impl Executor for SystemExecutor {
  fn shell(&mut self, invocation: &ShellInvocation) -> Result<(), ExecuteError> {
    info!(cmd = %invocation.command, "executing command");

    let status = self.run(&invocation.command, &invocation.cwd, &invocation.env)?;
    check_status(status).map_err(|code| ExecuteError::CmdFailed {
      cmd: invocation.command.clone(),
      code,
    })
  }

  fn fetch(&mut self, request: &FetchRequest) -> Result<(), ExecuteError> {
    let cmd = fetch_command_line(&self.fetch_command, request);
    info!(cmd = %cmd, platform = %request.platform, "fetching dependencies");

    let status = self.run(&cmd, &request.cwd, &request.env)?;
    check_status(status).map_err(|code| ExecuteError::FetchFailed {
      message: format!("`{}` exited with code {:?}", cmd, code),
    })
  }
}

/// Map a finished process to success or its exit code.
fn check_status(status: ExitStatus) -> Result<(), Option<i32>> {
  if status.success() {
    return Ok(());
  }
  Err(status.code())
}

/// Full fetch command line: the configured command plus the request arguments.
fn fetch_command_line(base: &str, request: &FetchRequest) -> String {
  let mut cmd = base.to_string();
  for arg in request.args() {
    cmd.push(' ');
    cmd.push_str(&quote_arg(&arg));
  }
  cmd
}

/// Quote an argument for the shell if it contains whitespace.
fn quote_arg(arg: &str) -> String {
  if arg.chars().any(char::is_whitespace) {
    format!("\"{}\"", arg)
  } else {
    arg.to_string()
  }
}

async fn spawn_and_stream(
  shell: &str,
  shell_args: &[String],
  cmd: &str,
  cwd: &Path,
  env: &BTreeMap<String, String>,
) -> Result<ExitStatus, ExecuteError> {
  let mut command = Command::new(shell);
  command
    .args(shell_args)
    .arg(cmd)
    .current_dir(cwd)
    .env_clear()
    .envs(env)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped());

  let mut child = command.spawn().map_err(|e| match e.kind() {
    std::io::ErrorKind::NotFound => ExecuteError::ToolNotFound {
      program: shell.to_string(),
    },
    _ => ExecuteError::Io(e),
  })?;

  let stdout = pump(child.stdout.take(), false);
  let stderr = pump(child.stderr.take(), true);
  let (status, _, _) = tokio::join!(child.wait(), stdout, stderr);
  let status = status?;

  if status.code() == Some(NOT_FOUND_STATUS) {
    return Err(ExecuteError::ToolNotFound {
      program: program_name(cmd).to_string(),
    });
  }

  Ok(status)
}

/// Forward a child pipe to our own stdout/stderr one line at a time.
///
/// Lines are raw bytes; tools printing in a legacy codepage are shown lossily
/// and the pipe keeps draining until EOF.
async fn pump<R: AsyncRead + Unpin>(reader: Option<R>, is_stderr: bool) {
  let Some(reader) = reader else { return };
  let mut reader = BufReader::new(reader);
  let mut buf = Vec::new();
  loop {
    buf.clear();
    match reader.read_until(b'\n', &mut buf).await {
      Ok(0) => break,
      Ok(_) => {}
      Err(e) => {
        debug!(stderr = is_stderr, error = %e, "stopped reading child output");
        break;
      }
    }
    let line = String::from_utf8_lossy(&buf);
    let line = line.trim_end_matches(['\n', '\r']);
    trace!(stderr = is_stderr, line = %line, "child output");
    if is_stderr {
      eprintln!("{}", line);
    } else {
      println!("{}", line);
    }
  }
}

/// First word of a command line.
fn program_name(cmd: &str) -> &str {
  cmd.split_whitespace().next().unwrap_or(cmd)
}

/// Get the shell command and arguments for the current platform.
///
/// The default is `/bin/sh -c` on Unix and `cmd.exe /C` on Windows, which is
/// what the MSBuild command lines are written for.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      vec!["-NoProfile".to_string(), "-Command".to_string()]
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("cmd.exe".to_string(), vec!["/C".to_string()])
  }
}
