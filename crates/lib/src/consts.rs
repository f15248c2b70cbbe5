//! Well-known names shared by the pipeline steps and the CLI.

/// Context key holding the resolved platform identifier (e.g. `Linux-x64`).
pub const PLATFORM_KEY: &str = "OH_PLATFORM";
/// Context key holding the title-case build configuration (`Release` / `Debug`).
pub const CONFIGURATION_KEY: &str = "MSBUILDCONFIGURATION";
/// Context key holding the parsed build info document.
pub const BUILDINFO_KEY: &str = "BUILDINFO";
pub const MSBUILD_CMD_KEY: &str = "MSBUILDCMD";
pub const MDTOOL_CMD_KEY: &str = "MDTOOLBUILDCMD";
pub const MSBUILD_TARGET_SWITCH_KEY: &str = "MSBUILDTARGETSWITCH";
pub const MSBUILD_SOLUTION_SUFFIX_KEY: &str = "MSBUILDSOLUTIONSUFFIX";

/// Agent identifier exported by the CI server on each build slave.
pub const AGENT_ENV: &str = "slave";
/// Truthy when the CI job is a release build that must also publish.
pub const PUBLISH_RELEASE_ENV: &str = "PUBLISH_RELEASE";

pub const PROJECT_DIR_ENV: &str = "CIBUILD_PROJECT_DIR";
pub const FETCH_CMD_ENV: &str = "CIBUILD_FETCH_CMD";
pub const SHELL_ENV: &str = "CIBUILD_SHELL";

pub const DEFAULT_FETCH_CMD: &str = "go fetch --all";

/// Build info document, relative to the project directory.
pub const BUILDINFO_PATH: &str = "projectdata/buildinfo.json";
