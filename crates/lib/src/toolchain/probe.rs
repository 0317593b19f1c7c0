//! Access to the machine being probed for toolchains.
//!
//! Everything the locator needs to know about the outside world goes through
//! [`Probe`], so the rule table can be exercised against a fake machine.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Component every usable install must provide
pub const VC_TOOLS_COMPONENT: &str = "Microsoft.VisualStudio.Component.VC.Tools.x86.x64";

pub trait Probe {
  /// Whether a regular file exists at `path`
  fn file_exists(&self, path: &Path) -> bool;

  /// Value of an environment variable, `None` when unset or empty
  fn env_var(&self, name: &str) -> Option<String>;

  /// Ask the vswhere utility for the newest install of one major version.
  ///
  /// Returns the installation root, or `None` when the query produced nothing usable.
  fn installation_path(&self, vswhere: &Path, major: u32) -> Option<PathBuf>;
}

/// Arguments passed to vswhere to find an install of `major` with a C++ toolset
pub fn vswhere_args(major: u32) -> Vec<String> {
  vec![
    "-latest".to_string(),
    "-requires".to_string(),
    VC_TOOLS_COMPONENT.to_string(),
    "-property".to_string(),
    "installationPath".to_string(),
    "-version".to_string(),
    format!("[{}.0,{}.0)", major, major + 1),
    "-prerelease".to_string(),
  ]
}

/// Probe backed by the real filesystem, environment and processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl Probe for SystemProbe {
  fn file_exists(&self, path: &Path) -> bool {
    path.is_file()
  }

  fn env_var(&self, name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
  }

  fn installation_path(&self, vswhere: &Path, major: u32) -> Option<PathBuf> {
    let output = match Command::new(vswhere).args(vswhere_args(major)).output() {
      Ok(output) => output,
      Err(e) => {
        debug!(vswhere = %vswhere.display(), error = %e, "vswhere could not be started");
        return None;
      }
    };

    if !output.status.success() {
      debug!(vswhere = %vswhere.display(), code = ?output.status.code(), "vswhere failed");
      return None;
    }

    first_line(&String::from_utf8_lossy(&output.stdout)).map(PathBuf::from)
  }
}

/// First non-empty line of vswhere output, which may use CRLF line endings
fn first_line(stdout: &str) -> Option<&str> {
  stdout.lines().map(str::trim).find(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  fn vswhere_version_range_is_half_open() {
    let args = vswhere_args(16);
    let pos = args.iter().position(|a| a == "-version").unwrap();
    assert_eq!(args[pos + 1], "[16.0,17.0)");
    assert!(args.contains(&"-prerelease".to_string()));
    assert!(args.contains(&VC_TOOLS_COMPONENT.to_string()));
  }

  #[test]
  fn first_line_handles_crlf_and_blank_output() {
    assert_eq!(
      first_line("C:\\VS\\2019\\Community\r\nC:\\VS\\Other\r\n"),
      Some("C:\\VS\\2019\\Community")
    );
    assert_eq!(first_line("\r\n"), None);
    assert_eq!(first_line(""), None);
  }

  #[test]
  #[serial]
  fn system_probe_treats_empty_variables_as_unset() {
    temp_env::with_vars(
      [("SCBUILD_PROBE_SET", Some("value")), ("SCBUILD_PROBE_EMPTY", Some(""))],
      || {
        assert_eq!(SystemProbe.env_var("SCBUILD_PROBE_SET").as_deref(), Some("value"));
        assert_eq!(SystemProbe.env_var("SCBUILD_PROBE_EMPTY"), None);
        assert_eq!(SystemProbe.env_var("SCBUILD_PROBE_MISSING"), None);
      },
    );
  }

  #[test]
  fn system_probe_only_reports_files() {
    let temp = tempfile::TempDir::new().unwrap();
    let file = temp.path().join("VCVARSALL.BAT");
    std::fs::write(&file, "").unwrap();

    assert!(SystemProbe.file_exists(&file));
    assert!(!SystemProbe.file_exists(temp.path()));
    assert!(!SystemProbe.file_exists(&temp.path().join("missing.bat")));
  }

  #[test]
  fn system_probe_ignores_missing_vswhere() {
    let temp = tempfile::TempDir::new().unwrap();
    assert_eq!(SystemProbe.installation_path(&temp.path().join("vswhere.exe"), 16), None);
  }
}
