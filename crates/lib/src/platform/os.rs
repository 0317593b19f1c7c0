use std::fmt;

/// Host operating system families the build can run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Win,
  Linux,
  Osx,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "windows" => Some(Self::Win),
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::Osx),
      _ => None,
    }
  }

  /// Returns the identifier used in build directory names
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Win => "win",
      Self::Linux => "linux",
      Self::Osx => "osx",
    }
  }

  /// Suffix appended to executables built for this platform
  pub fn exe_suffix(&self) -> &'static str {
    match self {
      Self::Win => ".exe",
      Self::Linux | Self::Osx => "",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn current_returns_supported_os() {
    assert!(Os::current().is_some(), "Current OS should be supported");
  }

  #[test]
  fn only_windows_has_exe_suffix() {
    assert_eq!(Os::Win.exe_suffix(), ".exe");
    assert_eq!(Os::Linux.exe_suffix(), "");
    assert_eq!(Os::Osx.exe_suffix(), "");
  }

  #[test]
  fn displays_directory_identifiers() {
    assert_eq!(Os::Win.to_string(), "win");
    assert_eq!(Os::Osx.to_string(), "osx");
  }
}
