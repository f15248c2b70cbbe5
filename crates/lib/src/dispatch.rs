//! Translating a solution into an external build command.
//!
//! The per-platform setup steps store a tool command line in the context
//! (`MSBUILDCMD` for msbuild/xbuild, `MDTOOLBUILDCMD` for mdtool). The
//! dispatcher picks one by the solution's tool family, appends the solution
//! path and target switch, and hands the result to the executor.

use std::fmt;

use tracing::info;

use crate::consts::{MDTOOL_CMD_KEY, MSBUILD_CMD_KEY, PLATFORM_KEY};
use crate::context::{BuildMode, Context};
use crate::error::CiError;
use crate::execute::{Executor, ShellInvocation};

/// A project or solution file to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
  /// Path relative to the project directory.
  pub path: &'static str,
  /// Build with mdtool instead of msbuild/xbuild.
  pub mdtool: bool,
}

impl Solution {
  /// Context key holding the tool command for this solution's tool family.
  pub fn tool_key(&self) -> &'static str {
    if self.mdtool { MDTOOL_CMD_KEY } else { MSBUILD_CMD_KEY }
  }

  pub fn target_switch(&self) -> &'static str {
    if self.mdtool { "-t:" } else { "/t:" }
  }
}

/// MSBuild target to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTarget {
  Clean,
  Build,
}

impl BuildTarget {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Clean => "Clean",
      Self::Build => "Build",
    }
  }
}

impl fmt::Display for BuildTarget {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// `msbuild` command for Windows hosts.
pub fn msbuild_command(mode: BuildMode) -> String {
  format!("msbuild /nologo /p:Configuration={}", mode.title())
}

/// `xbuild` command for Mono hosts.
pub fn xbuild_command(mode: BuildMode) -> String {
  format!("xbuild /nologo /p:Configuration={}", mode.title())
}

/// `mdtool` command; `program` is the path to the mdtool binary.
pub fn mdtool_command(program: &str, mode: BuildMode) -> String {
  format!("{} build \"-c:{}|Any CPU\"", program, mode.title())
}

/// The full command line for building `target` of `solution`.
pub fn command_line(ctx: &Context, solution: &Solution, target: BuildTarget) -> Result<String, CiError> {
  let key = solution.tool_key();
  let tool = ctx.get_str(key).ok_or_else(|| {
    CiError::Configuration(format!(
      "no build command configured for platform {} ({} is not set)",
      ctx.get_str(PLATFORM_KEY).unwrap_or("<unresolved>"),
      key
    ))
  })?;

  Ok(format!(
    "{} {} {}{}",
    tool,
    solution.path,
    solution.target_switch(),
    target
  ))
}

/// Build `target` of `solution`, blocking until the tool exits.
pub fn build(
  ctx: &Context,
  solution: &Solution,
  target: BuildTarget,
  exec: &mut dyn Executor,
) -> Result<(), CiError> {
  let command = command_line(ctx, solution, target)?;
  info!(solution = solution.path, build_target = %target, "invoking build tool");

  exec.shell(&ShellInvocation {
    command,
    cwd: ctx.project_dir.clone(),
    env: ctx.string_vars(),
  })?;
  Ok(())
}
