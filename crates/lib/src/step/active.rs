use std::collections::BTreeSet;
use std::fmt;

use tracing::warn;

use super::Step;

/// Step names and meta-tokens accepted by `--steps`.
pub const KNOWN_STEP_TOKENS: &[&str] = &[
  "all",
  "default",
  "fetch",
  "configure",
  "clean",
  "build",
  "tests",
  "publish",
];

/// The optional steps selected for this invocation.
///
/// A base selection of tokens (`all`, `default`, or step names) plus explicit
/// additions and removals. Removals win over everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSteps {
  selected: BTreeSet<String>,
  added: BTreeSet<String>,
  removed: BTreeSet<String>,
}

impl Default for ActiveSteps {
  fn default() -> Self {
    Self {
      selected: BTreeSet::from(["default".to_string()]),
      added: BTreeSet::new(),
      removed: BTreeSet::new(),
    }
  }
}

fn tokens(selection: &str) -> impl Iterator<Item = &str> {
  selection.split(',').map(str::trim).filter(|t| !t.is_empty())
}

impl ActiveSteps {
  /// A selection parsed from a comma separated list.
  pub fn parse(selection: &str) -> Self {
    let mut steps = Self::default();
    steps.specify(selection);
    steps
  }

  /// Replace the selection, discarding earlier additions and removals.
  pub fn specify(&mut self, selection: &str) {
    self.selected.clear();
    self.added.clear();
    self.removed.clear();
    for token in tokens(selection) {
      if !KNOWN_STEP_TOKENS.contains(&token) {
        warn!(token, "unknown step name in selection");
      }
      self.selected.insert(token.to_string());
    }
  }

  /// Adjust the selection with `+name` / `-name` tokens. A bare name adds.
  pub fn modify(&mut self, changes: &str) {
    for token in tokens(changes) {
      if let Some(name) = token.strip_prefix('-') {
        self.added.remove(name);
        self.removed.insert(name.to_string());
      } else {
        let name = token.strip_prefix('+').unwrap_or(token);
        self.removed.remove(name);
        self.added.insert(name.to_string());
      }
    }
  }

  /// Whether an optional step with this name and default flag is selected.
  pub fn includes(&self, name: &str, is_default: bool) -> bool {
    if self.removed.contains(name) {
      return false;
    }
    self.added.contains(name)
      || self.selected.contains(name)
      || self.selected.contains("all")
      || (is_default && self.selected.contains("default"))
  }

  pub fn contains(&self, step: &Step) -> bool {
    self.includes(step.name(), step.is_default())
  }
}

impl fmt::Display for ActiveSteps {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut parts: Vec<String> = self.selected.iter().cloned().collect();
    parts.extend(self.added.iter().map(|n| format!("+{}", n)));
    parts.extend(self.removed.iter().map(|n| format!("-{}", n)));
    write!(f, "{}", parts.join(","))
  }
}
