//! Named units of build work and the machinery that runs them.
//!
//! - [`Step`]: a named action with a [`Condition`] and an optional flag
//! - [`ActiveSteps`]: which optional steps this invocation selected
//! - [`StepRegistry`]: ordered registration and the sequential runner

mod active;
mod registry;

use std::fmt;

use crate::condition::Condition;
use crate::context::Context;
use crate::error::CiError;
use crate::execute::Executor;

pub use active::{ActiveSteps, KNOWN_STEP_TOKENS};
pub use registry::{RunSummary, StepRegistry};

/// The body of a step.
pub type Action = Box<dyn Fn(&mut Context, &mut dyn Executor) -> Result<(), CiError>>;

/// A named, possibly conditional unit of build work.
pub struct Step {
  name: String,
  condition: Condition,
  optional: bool,
  default: bool,
  action: Action,
}

impl Step {
  /// An unconditional step that always runs.
  pub fn new<F>(name: impl Into<String>, action: F) -> Self
  where
    F: Fn(&mut Context, &mut dyn Executor) -> Result<(), CiError> + 'static,
  {
    Self {
      name: name.into(),
      condition: Condition::Always,
      optional: false,
      default: false,
      action: Box::new(action),
    }
  }

  /// Gate the step on the active step set. Optional steps belong to the
  /// `default` selection unless [`Step::not_default`] is also applied.
  pub fn optional(mut self) -> Self {
    self.optional = true;
    self.default = true;
    self
  }

  /// Leave an optional step out of the `default` selection.
  pub fn not_default(mut self) -> Self {
    self.default = false;
    self
  }

  /// Only run when `condition` matches the context.
  pub fn when(mut self, condition: Condition) -> Self {
    self.condition = condition;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn condition(&self) -> &Condition {
    &self.condition
  }

  pub fn is_optional(&self) -> bool {
    self.optional
  }

  pub fn is_default(&self) -> bool {
    self.optional && self.default
  }

  pub(crate) fn invoke(&self, ctx: &mut Context, exec: &mut dyn Executor) -> Result<(), CiError> {
    (self.action)(ctx, exec)
  }
}

impl fmt::Debug for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Step")
      .field("name", &self.name)
      .field("condition", &self.condition)
      .field("optional", &self.optional)
      .field("default", &self.default)
      .finish_non_exhaustive()
  }
}
