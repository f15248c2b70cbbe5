//! The project's build behaviour for continuous integration.
//!
//! Steps, in order:
//!
//! 1. `choose_optional_steps` - compute the active step set from the options
//! 2. `choose_platform` - resolve `OH_PLATFORM` and the MSBuild configuration
//! 3. `get_buildinfo` - load `projectdata/buildinfo.json` into `BUILDINFO`
//! 4. `setup_windows` / `setup_linux` - per-OS tool commands (one branch runs)
//! 5. `fetch`, `clean`, `build` - optional, all in the `default` selection

use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::condition::Condition;
use crate::consts::{
  AGENT_ENV, BUILDINFO_KEY, BUILDINFO_PATH, CONFIGURATION_KEY, MDTOOL_CMD_KEY, MSBUILD_CMD_KEY,
  MSBUILD_SOLUTION_SUFFIX_KEY, MSBUILD_TARGET_SWITCH_KEY, PLATFORM_KEY, PUBLISH_RELEASE_ENV,
};
use crate::context::Context;
use crate::dispatch::{self, BuildTarget, Solution, mdtool_command, msbuild_command, xbuild_command};
use crate::error::{BuildInfoError, CiError};
use crate::execute::{Executor, FetchRequest};
use crate::platform::{self, Os, PlatformId};
use crate::step::{RunSummary, Step, StepRegistry};

/// Solutions built by the `clean` and `build` steps.
pub const SOLUTIONS: &[Solution] = &[Solution {
  path: "src/ohPlaylistManager/ohPlaylistManager.csproj",
  mdtool: false,
}];

const MAC_MDTOOL: &str = "/Applications/MonoDevelop.app/Contents/MacOS/mdtool";

/// Register the pipeline's steps in execution order.
pub fn registry() -> StepRegistry {
  let mut registry = StepRegistry::new();
  registry
    .register(Step::new("choose_optional_steps", choose_optional_steps))
    .register(Step::new("choose_platform", choose_platform))
    .register(Step::new("get_buildinfo", get_buildinfo))
    .register(
      Step::new("setup_windows", setup_windows)
        .when(Condition::platform_in([PlatformId::WINDOWS_X86, PlatformId::WINDOWS_X64])),
    )
    .register(Step::new("setup_linux", setup_linux).when(Condition::platform_in(PlatformId::family(Os::Linux))))
    // The Mac branch shares the Linux step's name; only one of the two can match.
    .register(Step::new("setup_linux", setup_mac).when(Condition::platform_in(PlatformId::family(Os::Mac))))
    .register(Step::new("fetch", fetch).optional())
    .register(Step::new("clean", clean).optional())
    .register(Step::new("build", build).optional());
  registry
}

/// Run the full pipeline against `ctx`.
pub fn run(ctx: &mut Context, exec: &mut dyn Executor) -> Result<RunSummary, CiError> {
  registry().run(ctx, exec)
}

fn choose_optional_steps(ctx: &mut Context, _: &mut dyn Executor) -> Result<(), CiError> {
  ctx.steps.specify(&ctx.options.steps);

  if ctx.options.publish_version.is_some() || ctx.is_truthy(PUBLISH_RELEASE_ENV) {
    ctx.steps.modify("+publish");
  }
  if ctx.options.no_fetch {
    ctx.steps.modify("-fetch");
  }
  if ctx.options.fetch_only {
    ctx.steps.specify("fetch");
  }

  info!(steps = %ctx.steps, "selected steps");
  Ok(())
}

fn choose_platform(ctx: &mut Context, _: &mut dyn Executor) -> Result<(), CiError> {
  let platform = platform::resolve(ctx.options.target.as_deref(), ctx.get_str(AGENT_ENV))?;
  info!(platform = %platform, mode = %ctx.options.mode, "resolved platform");

  ctx.set(PLATFORM_KEY, platform.to_string());
  ctx.set(CONFIGURATION_KEY, ctx.options.mode.title());
  Ok(())
}

/// Read and parse the build info document.
pub fn load_build_info(path: &Path) -> Result<Value, CiError> {
  let build_info_err = |source: BuildInfoError| CiError::BuildInfo {
    path: path.to_path_buf(),
    source,
  };
  let content = std::fs::read_to_string(path).map_err(|e| build_info_err(e.into()))?;
  serde_json::from_str(&content).map_err(|e| build_info_err(e.into()))
}

fn get_buildinfo(ctx: &mut Context, _: &mut dyn Executor) -> Result<(), CiError> {
  let info = load_build_info(&ctx.project_path(BUILDINFO_PATH))?;
  ctx.set(BUILDINFO_KEY, info);
  Ok(())
}

fn setup_windows(ctx: &mut Context, _: &mut dyn Executor) -> Result<(), CiError> {
  let mode = ctx.options.mode;
  ctx.set(MSBUILD_CMD_KEY, msbuild_command(mode));
  ctx.set(MSBUILD_TARGET_SWITCH_KEY, "/t:");
  ctx.set(MSBUILD_SOLUTION_SUFFIX_KEY, "Windows");
  Ok(())
}

fn setup_linux(ctx: &mut Context, _: &mut dyn Executor) -> Result<(), CiError> {
  let mode = ctx.options.mode;
  ctx.set(MDTOOL_CMD_KEY, mdtool_command("mdtool", mode));
  ctx.set(MSBUILD_CMD_KEY, xbuild_command(mode));
  Ok(())
}

fn setup_mac(ctx: &mut Context, _: &mut dyn Executor) -> Result<(), CiError> {
  let mode = ctx.options.mode;
  ctx.set(MDTOOL_CMD_KEY, mdtool_command(MAC_MDTOOL, mode));
  ctx.set(MSBUILD_CMD_KEY, xbuild_command(mode));
  Ok(())
}

fn fetch(ctx: &mut Context, exec: &mut dyn Executor) -> Result<(), CiError> {
  let platform: PlatformId = ctx
    .get_str(PLATFORM_KEY)
    .ok_or_else(|| CiError::Configuration(format!("{} is not set", PLATFORM_KEY)))?
    .parse()?;
  let mode = ctx.options.mode;

  let mut env = ctx.string_vars();
  env.insert("debugmode".to_string(), mode.as_str().to_string());
  env.insert("titlecase-debugmode".to_string(), mode.title().to_string());

  exec.fetch(&FetchRequest {
    platform,
    mode,
    artifacts: ctx.options.artifacts.clone(),
    cwd: ctx.project_dir.clone(),
    env,
  })?;
  Ok(())
}

fn build_all(ctx: &Context, target: BuildTarget, exec: &mut dyn Executor) -> Result<(), CiError> {
  for solution in SOLUTIONS {
    dispatch::build(ctx, solution, target, exec)?;
  }
  Ok(())
}

// Older build scripts sent `/t:Build` from this step too; it now invokes `Clean`.
fn clean(ctx: &mut Context, exec: &mut dyn Executor) -> Result<(), CiError> {
  build_all(ctx, BuildTarget::Clean, exec)
}

fn build(ctx: &mut Context, exec: &mut dyn Executor) -> Result<(), CiError> {
  build_all(ctx, BuildTarget::Build, exec)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::{BuildMode, BuildOptions};
  use crate::util::testutil::RecordingExecutor;
  use tempfile::TempDir;

  const BUILDINFO: &str = r#"{ "version": "1.4.0", "branch": "main" }"#;

  fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("projectdata");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("buildinfo.json"), BUILDINFO).unwrap();
    temp
  }

  fn options(target: &str, steps: &str) -> BuildOptions {
    BuildOptions {
      target: Some(target.to_string()),
      steps: steps.to_string(),
      ..BuildOptions::default()
    }
  }

  fn run_with(
    project: &TempDir,
    options: BuildOptions,
    env: &[(&str, &str)],
    exec: &mut RecordingExecutor,
  ) -> (Context, Result<RunSummary, CiError>) {
    let mut ctx = Context::with_env(options, project.path(), env.iter().copied());
    let result = run(&mut ctx, exec);
    (ctx, result)
  }

  #[test]
  fn each_platform_runs_only_its_setup_step() {
    let project = project();
    let cases = [
      ("Windows-x86", "setup_windows", "msbuild /nologo /p:Configuration=Release"),
      ("Windows-x64", "setup_windows", "msbuild /nologo /p:Configuration=Release"),
      ("Linux-x86", "setup_linux", "xbuild /nologo /p:Configuration=Release"),
      ("Linux-x64", "setup_linux", "xbuild /nologo /p:Configuration=Release"),
      ("Linux-ARM", "setup_linux", "xbuild /nologo /p:Configuration=Release"),
    ];

    for (target, setup, msbuild) in cases {
      let mut exec = RecordingExecutor::default();
      let (ctx, result) = run_with(&project, options(target, "configure"), &[], &mut exec);
      let summary = result.unwrap();

      let setups: Vec<_> = summary.executed.iter().filter(|s| s.starts_with("setup_")).collect();
      assert_eq!(setups, vec![setup], "{target}");
      assert_eq!(ctx.get_str(MSBUILD_CMD_KEY), Some(msbuild), "{target}");
      assert_eq!(ctx.get_str(PLATFORM_KEY), Some(target));

      let windows = target.starts_with("Windows");
      assert_eq!(ctx.get_str(MSBUILD_SOLUTION_SUFFIX_KEY).is_some(), windows, "{target}");
      assert_eq!(ctx.get_str(MDTOOL_CMD_KEY).is_some(), !windows, "{target}");
      assert!(exec.invocations.is_empty());
    }
  }

  #[test]
  fn mac_branch_runs_under_the_linux_step_name() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let (ctx, result) = run_with(&project, options("Mac-x64", "configure"), &[], &mut exec);

    let summary = result.unwrap();
    assert_eq!(summary.executed.iter().filter(|s| *s == "setup_linux").count(), 1);
    assert!(ctx.get_str(MDTOOL_CMD_KEY).unwrap().starts_with(MAC_MDTOOL));
  }

  #[test]
  fn windows_arm_has_no_setup_step() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let (_, result) = run_with(&project, options("Windows-ARM", "build"), &[], &mut exec);

    let err = result.unwrap_err();
    assert!(err.is_configuration());
    assert!(exec.invocations.is_empty());
  }

  #[test]
  fn fetch_selection_runs_only_fetch() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let (_, result) = run_with(&project, options("Linux-x64", "fetch"), &[], &mut exec);

    let summary = result.unwrap();
    assert_eq!(exec.fetches.len(), 1);
    assert!(exec.invocations.is_empty());
    assert!(summary.skipped.contains(&"clean".to_string()));
    assert!(summary.skipped.contains(&"build".to_string()));
  }

  #[test]
  fn fetch_request_carries_mode_and_artifacts() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let opts = BuildOptions {
      mode: BuildMode::Debug,
      artifacts: Some("/srv/artifacts".into()),
      ..options("Linux-ARM", "fetch")
    };
    run_with(&project, opts, &[], &mut exec).1.unwrap();

    let request = &exec.fetches[0];
    assert_eq!(request.platform, PlatformId::LINUX_ARM);
    assert_eq!(request.mode, BuildMode::Debug);
    assert_eq!(request.artifacts.as_deref(), Some(Path::new("/srv/artifacts")));
    assert_eq!(request.env.get("debugmode").map(String::as_str), Some("debug"));
    assert_eq!(request.env.get("titlecase-debugmode").map(String::as_str), Some("Debug"));
  }

  #[test]
  fn publish_version_adds_publish_step() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let opts = BuildOptions {
      publish_version: Some("1.4.0".to_string()),
      ..options("Linux-x64", "build")
    };
    let (ctx, result) = run_with(&project, opts, &[], &mut exec);
    result.unwrap();

    assert!(ctx.steps.includes("publish", false));
    assert!(ctx.steps.includes("build", true));
  }

  #[test]
  fn publish_release_env_adds_publish_step() {
    let project = project();
    for (value, expected) in [("True", true), ("false", false)] {
      let mut exec = RecordingExecutor::default();
      let (ctx, result) = run_with(
        &project,
        options("Linux-x64", "configure"),
        &[(PUBLISH_RELEASE_ENV, value)],
        &mut exec,
      );
      result.unwrap();
      assert_eq!(ctx.steps.includes("publish", false), expected, "{value}");
    }
  }

  #[test]
  fn fetch_only_narrows_selection_even_when_publishing() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let opts = BuildOptions {
      fetch_only: true,
      publish_version: Some("2.0".to_string()),
      ..options("Linux-x64", "all")
    };
    let (ctx, result) = run_with(&project, opts, &[], &mut exec);
    result.unwrap();

    assert!(!ctx.steps.includes("publish", false));
    assert_eq!(exec.fetches.len(), 1);
    assert!(exec.invocations.is_empty());
  }

  #[test]
  fn no_fetch_skips_fetch_from_default_selection() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let opts = BuildOptions {
      no_fetch: true,
      ..options("Linux-x64", "default")
    };
    let (_, result) = run_with(&project, opts, &[], &mut exec);
    result.unwrap();

    assert!(exec.fetches.is_empty());
    assert_eq!(exec.invocations.len(), 2);
  }

  #[test]
  fn explicit_target_wins_over_agent_identifier() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let (ctx, result) = run_with(
      &project,
      options("Linux-x64", "configure"),
      &[(AGENT_ENV, "Windows-x86")],
      &mut exec,
    );
    result.unwrap();
    assert_eq!(ctx.get_str(PLATFORM_KEY), Some("Linux-x64"));
  }

  #[test]
  fn agent_identifier_used_without_target() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let opts = BuildOptions {
      steps: "configure".to_string(),
      ..BuildOptions::default()
    };
    let (ctx, result) = run_with(&project, opts, &[(AGENT_ENV, "Windows-x64")], &mut exec);
    result.unwrap();
    assert_eq!(ctx.get_str(PLATFORM_KEY), Some("Windows-x64"));
  }

  #[test]
  fn linux_build_end_to_end() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let (ctx, result) = run_with(&project, options("Linux-x64", "build"), &[], &mut exec);

    let summary = result.unwrap();
    assert_eq!(
      summary.executed,
      vec![
        "choose_optional_steps",
        "choose_platform",
        "get_buildinfo",
        "setup_linux",
        "build"
      ]
    );
    assert_eq!(
      exec.commands(),
      vec!["xbuild /nologo /p:Configuration=Release src/ohPlaylistManager/ohPlaylistManager.csproj /t:Build"]
    );
    assert!(exec.fetches.is_empty());
    assert_eq!(ctx.get(BUILDINFO_KEY).unwrap()["version"], "1.4.0");
    assert_eq!(ctx.get_str(CONFIGURATION_KEY), Some("Release"));
  }

  #[test]
  fn debug_mode_flows_into_commands() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let opts = BuildOptions {
      mode: BuildMode::Debug,
      ..options("Windows-x64", "clean")
    };
    let (ctx, result) = run_with(&project, opts, &[], &mut exec);
    result.unwrap();

    assert_eq!(ctx.get_str(CONFIGURATION_KEY), Some("Debug"));
    assert_eq!(
      exec.commands(),
      vec!["msbuild /nologo /p:Configuration=Debug src/ohPlaylistManager/ohPlaylistManager.csproj /t:Clean"]
    );
  }

  #[test]
  fn failing_build_tool_aborts_remaining_steps() {
    let project = project();
    let mut exec = RecordingExecutor::default().fail_on("/t:Clean", 4);
    let (_, result) = run_with(&project, options("Linux-x64", "default"), &[], &mut exec);

    let err = result.unwrap_err();
    assert!(matches!(err, CiError::BuildTool { code: Some(4), .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(exec.invocations.len(), 1, "build must not run after clean failed");
  }

  #[test]
  fn failing_fetch_is_a_dependency_error() {
    let project = project();
    let mut exec = RecordingExecutor::default().fail_fetch();
    let (_, result) = run_with(&project, options("Linux-x64", "default"), &[], &mut exec);

    assert!(matches!(result.unwrap_err(), CiError::DependencyFetch(_)));
    assert!(exec.invocations.is_empty());
  }

  #[test]
  fn missing_buildinfo_aborts_before_building() {
    let project = TempDir::new().unwrap();
    let mut exec = RecordingExecutor::default();
    let (_, result) = run_with(&project, options("Linux-x64", "build"), &[], &mut exec);

    let err = result.unwrap_err();
    assert!(matches!(
      err,
      CiError::BuildInfo { source: BuildInfoError::Read(ref e), .. } if e.kind() == std::io::ErrorKind::NotFound
    ));
    assert!(exec.invocations.is_empty());
  }

  #[test]
  fn malformed_buildinfo_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("buildinfo.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = load_build_info(&path).unwrap_err();
    assert!(matches!(err, CiError::BuildInfo { source: BuildInfoError::Parse(_), .. }));

    let source = std::error::Error::source(&err).unwrap();
    assert!(source.downcast_ref::<BuildInfoError>().is_some());
  }

  #[test]
  fn unknown_target_is_rejected_before_any_command() {
    let project = project();
    let mut exec = RecordingExecutor::default();
    let (_, result) = run_with(&project, options("Solaris-x64", "build"), &[], &mut exec);

    assert!(matches!(result.unwrap_err(), CiError::UnknownPlatform(_)));
    assert!(exec.invocations.is_empty());
  }
}
