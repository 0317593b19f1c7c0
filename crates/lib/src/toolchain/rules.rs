//! Ordered probe rules for finding a Visual C++ install.
//!
//! Each generation has a fixed list of rules. Rules are tried in order and
//! each yields candidate directories that should contain `VCVARSALL.BAT`;
//! the first candidate where it exists wins.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::probe::Probe;

const EDITIONS: &[&str] = &["Community", "Professional", "Enterprise"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRule {
  /// Newest install of one major version reported by vswhere
  VsWhere { major: u32 },
  /// `{ProgramFiles}\Microsoft Visual Studio\{name}\{edition}\VC\Auxiliary\Build`,
  /// names outermost
  InstallRoots {
    names: &'static [&'static str],
    editions: &'static [&'static str],
  },
  /// Directory named by an environment variable, then `relative`
  EnvVar {
    var: &'static str,
    relative: &'static [&'static str],
  },
  /// `{ProgramFiles}\` then `relative`
  ProgramFiles { relative: &'static [&'static str] },
}

pub const VS2019_RULES: &[ProbeRule] = &[
  ProbeRule::VsWhere { major: 16 },
  ProbeRule::InstallRoots {
    names: &["Preview", "2019"],
    editions: EDITIONS,
  },
];

pub const VS2017_RULES: &[ProbeRule] = &[
  ProbeRule::VsWhere { major: 15 },
  ProbeRule::InstallRoots {
    names: &["Preview", "2017"],
    editions: EDITIONS,
  },
];

pub const VS2015_RULES: &[ProbeRule] = &[
  ProbeRule::EnvVar {
    var: "VS140COMNTOOLS",
    relative: &["..", "..", "VC"],
  },
  ProbeRule::ProgramFiles {
    relative: &["Microsoft Visual Studio 14.0", "VC"],
  },
];

impl ProbeRule {
  /// Candidate directories produced by this rule, in priority order
  pub fn candidates(&self, probe: &impl Probe, program_files: &Path) -> Vec<PathBuf> {
    match self {
      ProbeRule::VsWhere { major } => {
        let vswhere = program_files
          .join("Microsoft Visual Studio")
          .join("Installer")
          .join("vswhere.exe");
        if !probe.file_exists(&vswhere) {
          debug!(vswhere = %vswhere.display(), "vswhere not installed");
          return Vec::new();
        }
        probe
          .installation_path(&vswhere, *major)
          .map(|install| auxiliary_build(&install))
          .into_iter()
          .collect()
      }
      ProbeRule::InstallRoots { names, editions } => {
        let vs = program_files.join("Microsoft Visual Studio");
        names
          .iter()
          .flat_map(|name| editions.iter().map(move |edition| (name, edition)))
          .map(|(name, edition)| auxiliary_build(&vs.join(name).join(edition)))
          .collect()
      }
      ProbeRule::EnvVar { var, relative } => probe
        .env_var(var)
        .map(|value| join_all(PathBuf::from(value), relative))
        .into_iter()
        .collect(),
      ProbeRule::ProgramFiles { relative } => vec![join_all(program_files.to_path_buf(), relative)],
    }
  }
}

fn auxiliary_build(install: &Path) -> PathBuf {
  install.join("VC").join("Auxiliary").join("Build")
}

fn join_all(base: PathBuf, parts: &[&str]) -> PathBuf {
  parts.iter().fold(base, |path, part| path.join(part))
}
