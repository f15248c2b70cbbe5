use std::fmt;

/// Operating system families the pipeline knows how to build on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Windows,
  Linux,
  Mac,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    Self::from_host(std::env::consts::OS)
  }

  /// Map a `std::env::consts::OS` value to an OS family
  pub fn from_host(os: &str) -> Option<Self> {
    match os {
      "windows" => Some(Self::Windows),
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::Mac),
      _ => None,
    }
  }

  /// Parse the OS half of a platform identifier, ignoring case
  pub fn parse(s: &str) -> Option<Self> {
    match s.to_ascii_lowercase().as_str() {
      "windows" => Some(Self::Windows),
      "linux" => Some(Self::Linux),
      "mac" => Some(Self::Mac),
      _ => None,
    }
  }

  /// Returns the identifier used in platform names
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Windows => "Windows",
      Self::Linux => "Linux",
      Self::Mac => "Mac",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
