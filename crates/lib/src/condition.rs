//! Step preconditions.
//!
//! A condition is evaluated against the [`Context`] immediately before its
//! step would run, so it observes whatever earlier steps have written.

use crate::consts::PLATFORM_KEY;
use crate::context::Context;
use crate::platform::PlatformId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Condition {
  /// Unconditional.
  #[default]
  Always,
  /// The key exists and holds exactly this string.
  Equals { key: String, value: String },
  /// Every inner condition holds.
  All(Vec<Condition>),
  /// At least one inner condition holds.
  Any(Vec<Condition>),
}

impl Condition {
  pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self::Equals {
      key: key.into(),
      value: value.into(),
    }
  }

  /// Every `(key, value)` pair must be present and equal.
  pub fn all_of<I, K, V>(pairs: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self::All(pairs.into_iter().map(|(k, v)| Self::equals(k, v)).collect())
  }

  /// The resolved platform is one of `platforms`.
  pub fn platform_in(platforms: impl IntoIterator<Item = PlatformId>) -> Self {
    Self::Any(
      platforms
        .into_iter()
        .map(|p| Self::equals(PLATFORM_KEY, p.to_string()))
        .collect(),
    )
  }

  pub fn matches(&self, ctx: &Context) -> bool {
    match self {
      Self::Always => true,
      Self::Equals { key, value } => ctx.get_str(key) == Some(value.as_str()),
      Self::All(conditions) => conditions.iter().all(|c| c.matches(ctx)),
      Self::Any(conditions) => conditions.iter().any(|c| c.matches(ctx)),
    }
  }
}
