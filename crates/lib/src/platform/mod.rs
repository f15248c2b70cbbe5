//! Target platform identification.
//!
//! A platform is an OS family plus a CPU architecture, written `<Os>-<Arch>`
//! (e.g. `Linux-x64`, `Windows-x86`, `Linux-ARM`). The build setup steps key
//! off this identifier.

pub mod arch;
pub mod os;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::CiError;

pub use arch::Arch;
pub use os::Os;

/// Platform identifier combining OS and architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformId {
  pub os: Os,
  pub arch: Arch,
}

impl PlatformId {
  pub const WINDOWS_X86: Self = Self::new(Os::Windows, Arch::X86);
  pub const WINDOWS_X64: Self = Self::new(Os::Windows, Arch::X64);
  pub const LINUX_X86: Self = Self::new(Os::Linux, Arch::X86);
  pub const LINUX_X64: Self = Self::new(Os::Linux, Arch::X64);
  pub const LINUX_ARM: Self = Self::new(Os::Linux, Arch::Arm);
  pub const MAC_X86: Self = Self::new(Os::Mac, Arch::X86);
  pub const MAC_X64: Self = Self::new(Os::Mac, Arch::X64);
  pub const MAC_ARM: Self = Self::new(Os::Mac, Arch::Arm);

  pub const fn new(os: Os, arch: Arch) -> Self {
    Self { os, arch }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      os: Os::current()?,
      arch: Arch::current()?,
    })
  }

  /// Every platform of the given OS family.
  pub fn family(os: Os) -> [Self; 3] {
    [Self::new(os, Arch::X86), Self::new(os, Arch::X64), Self::new(os, Arch::Arm)]
  }
}

impl fmt::Display for PlatformId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.os, self.arch)
  }
}

impl FromStr for PlatformId {
  type Err = CiError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let unknown = || CiError::UnknownPlatform(s.to_string());
    let (os, arch) = s.trim().split_once('-').ok_or_else(unknown)?;
    Ok(Self {
      os: Os::parse(os).ok_or_else(unknown)?,
      arch: Arch::parse(arch).ok_or_else(unknown)?,
    })
  }
}

/// Resolve the platform to build for.
///
/// First match wins: the explicit target, then the CI agent identifier, then
/// host detection. Empty values count as absent.
pub fn resolve(target: Option<&str>, agent: Option<&str>) -> Result<PlatformId, CiError> {
  resolve_from(target, agent, PlatformId::current())
}

/// [`resolve`] with the host detection result supplied by the caller.
pub fn resolve_from(
  target: Option<&str>,
  agent: Option<&str>,
  detected: Option<PlatformId>,
) -> Result<PlatformId, CiError> {
  fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|v| !v.is_empty())
  }

  if let Some(target) = non_empty(target) {
    debug!(value = target, "platform from --target");
    return target.parse();
  }

  if let Some(agent) = non_empty(agent) {
    debug!(value = agent, "platform from agent identifier");
    return agent.parse();
  }

  detected.ok_or_else(|| CiError::UndetectedPlatform {
    os: std::env::consts::OS.to_string(),
    arch: std::env::consts::ARCH.to_string(),
  })
}
