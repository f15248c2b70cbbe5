//! cibuild-lib: continuous-integration build steps for the playlist manager.
//!
//! The crate provides:
//! - `Context`: mutable key/value state threaded through every step
//! - `Step` / `StepRegistry`: ordered, optionally conditional units of work
//! - `Condition`: preconditions evaluated against the context
//! - `platform`: target platform resolution (`--target`, CI agent, host)
//! - `dispatch`: turning a solution into an msbuild/xbuild/mdtool invocation
//! - `pipeline`: the project's concrete step table

pub mod condition;
pub mod config;
pub mod consts;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod execute;
pub mod pipeline;
pub mod platform;
pub mod step;
#[cfg(test)]
mod util;

pub use condition::Condition;
pub use context::{BuildMode, BuildOptions, Context};
pub use error::CiError;
pub use execute::{Executor, SystemExecutor};
pub use platform::PlatformId;
pub use step::{ActiveSteps, RunSummary, Step, StepRegistry};
