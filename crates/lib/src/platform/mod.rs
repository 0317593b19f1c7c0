//! Host detection.
//!
//! The host is computed once at process start and passed around as an
//! immutable [`Host`] value.

pub mod arch;
pub mod os;

use std::fmt;
use std::num::NonZeroUsize;

pub use arch::Arch;
pub use os::Os;

use crate::error::BuildError;

/// The machine the build runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Host {
  pub os: Os,
  pub arch: Arch,
  /// Logical core count, handed to the generator as its job count
  pub parallelism: usize,
}

impl Host {
  pub fn new(os: Os, arch: Arch, parallelism: usize) -> Self {
    Self {
      os,
      arch,
      parallelism: parallelism.max(1),
    }
  }

  /// Detect the current host at runtime
  pub fn detect() -> Result<Self, BuildError> {
    let os = Os::current().ok_or_else(|| BuildError::UnsupportedHost(std::env::consts::OS.to_string()))?;
    let arch = Arch::current().ok_or_else(|| BuildError::UnsupportedHost(std::env::consts::ARCH.to_string()))?;
    let parallelism = std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1);
    Ok(Self::new(os, arch, parallelism))
  }

  pub fn is_windows(&self) -> bool {
    self.os == Os::Win
  }
}

impl fmt::Display for Host {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{}", self.os, self.arch)
  }
}
