use tracing::{debug, error, info};

use super::Step;
use crate::context::Context;
use crate::error::CiError;
use crate::execute::Executor;

/// Names of the steps a completed run executed and skipped, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
  pub executed: Vec<String>,
  pub skipped: Vec<String>,
}

/// Ordered list of registered steps.
#[derive(Debug, Default)]
pub struct StepRegistry {
  steps: Vec<Step>,
}

impl StepRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a step.
  ///
  /// Registering a name that already exists adds an alternative branch rather
  /// than replacing the earlier one; each branch is still gated by its own
  /// condition.
  pub fn register(&mut self, step: Step) -> &mut Self {
    if self.steps.iter().any(|s| s.name() == step.name()) {
      debug!(step = step.name(), "registering alternative for existing step");
    }
    self.steps.push(step);
    self
  }

  pub fn len(&self) -> usize {
    self.steps.len()
  }

  pub fn is_empty(&self) -> bool {
    self.steps.is_empty()
  }

  /// Whether `step` should run against the context as it is right now.
  fn is_eligible(step: &Step, ctx: &Context) -> bool {
    if step.is_optional() && !ctx.steps.contains(step) {
      debug!(step = step.name(), active = %ctx.steps, "skipping step: not selected");
      return false;
    }
    if !step.condition().matches(ctx) {
      debug!(step = step.name(), "skipping step: condition not met");
      return false;
    }
    true
  }

  /// Run every eligible step once, in registration order.
  ///
  /// The first failing step aborts the run; its error is returned unchanged
  /// and no later step runs.
  pub fn run(&self, ctx: &mut Context, exec: &mut dyn Executor) -> Result<RunSummary, CiError> {
    let mut summary = RunSummary::default();

    for step in &self.steps {
      if !Self::is_eligible(step, ctx) {
        summary.skipped.push(step.name().to_string());
        continue;
      }

      info!(step = step.name(), "running step");
      if let Err(e) = step.invoke(ctx, exec) {
        error!(step = step.name(), error = %e, "step failed");
        return Err(e);
      }
      summary.executed.push(step.name().to_string());
    }

    info!(
      executed = summary.executed.len(),
      skipped = summary.skipped.len(),
      "all steps complete"
    );
    Ok(summary)
  }
}
