use std::fmt;
use std::str::FromStr;

use crate::error::BuildError;

/// CPU architectures a build can be hosted on or target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X64,
  X86,
  Arm64,
  Arm,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::X64),
      "x86" => Some(Self::X86),
      "aarch64" => Some(Self::Arm64),
      "arm" => Some(Self::Arm),
      _ => None,
    }
  }

  /// Returns the lowercase token used on the command line and in directory names
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X64 => "x64",
      Self::X86 => "x86",
      Self::Arm64 => "arm64",
      Self::Arm => "arm",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Arch {
  type Err = BuildError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "x64" => Ok(Self::X64),
      "x86" => Ok(Self::X86),
      "arm64" => Ok(Self::Arm64),
      "arm" => Ok(Self::Arm),
      other => Err(BuildError::UnsupportedArchitecture(other.to_string())),
    }
  }
}
