use std::fmt;

/// CPU architectures the pipeline knows how to build for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86,
  X64,
  Arm,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    Self::from_host(std::env::consts::ARCH)
  }

  /// Map a `std::env::consts::ARCH` value to an architecture
  pub fn from_host(arch: &str) -> Option<Self> {
    match arch {
      "x86" => Some(Self::X86),
      "x86_64" => Some(Self::X64),
      "arm" | "aarch64" => Some(Self::Arm),
      _ => None,
    }
  }

  /// Parse the architecture half of a platform identifier, ignoring case
  pub fn parse(s: &str) -> Option<Self> {
    match s.to_ascii_lowercase().as_str() {
      "x86" => Some(Self::X86),
      "x64" => Some(Self::X64),
      "arm" => Some(Self::Arm),
      _ => None,
    }
  }

  /// Returns the identifier used in platform names
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86 => "x86",
      Self::X64 => "x64",
      Self::Arm => "ARM",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn aarch64_is_arm() {
    assert_eq!(Arch::from_host("aarch64"), Some(Arch::Arm));
    assert_eq!(Arch::from_host("x86_64"), Some(Arch::X64));
    assert_eq!(Arch::from_host("riscv64"), None);
  }
}
