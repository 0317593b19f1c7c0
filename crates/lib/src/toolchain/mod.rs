//! Visual C++ toolchain discovery.
//!
//! On Windows every build first runs `VCVARSALL.BAT` to set up the compiler
//! environment. This module finds that script for the requested Visual Studio
//! generation and works out the arguments to call it with. Other platforms
//! expect the compiler on `PATH` and get no handle.

pub mod probe;
pub mod rules;

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, info};

pub use probe::{Probe, SystemProbe};
pub use rules::ProbeRule;

use crate::config::{BuildConfig, BuildSystem, Compiler};
use crate::consts::VCVARSALL;
use crate::error::BuildError;
use crate::platform::{Arch, Host};

/// Installed Visual Studio release providing a toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VsGeneration {
  Vs2015,
  Vs2017,
  Vs2019,
}

impl VsGeneration {
  /// Generation whose toolchain a build system and compiler pair needs.
  ///
  /// Ninja builds pick the generation from the compiler.
  pub fn for_build(build_system: BuildSystem, compiler: Compiler) -> Option<Self> {
    match (build_system, compiler) {
      (BuildSystem::Vs2019, _) | (BuildSystem::Ninja, Compiler::Vc142) => Some(Self::Vs2019),
      (BuildSystem::Vs2017, _) | (BuildSystem::Ninja, Compiler::Vc141) => Some(Self::Vs2017),
      (BuildSystem::Vs2015, _) | (BuildSystem::Ninja, Compiler::Vc140) => Some(Self::Vs2015),
      (BuildSystem::Ninja, Compiler::Gcc | Compiler::Clang) => None,
    }
  }

  pub fn rules(&self) -> &'static [ProbeRule] {
    match self {
      Self::Vs2015 => rules::VS2015_RULES,
      Self::Vs2017 => rules::VS2017_RULES,
      Self::Vs2019 => rules::VS2019_RULES,
    }
  }

  pub fn year(&self) -> &'static str {
    match self {
      Self::Vs2015 => "2015",
      Self::Vs2017 => "2017",
      Self::Vs2019 => "2019",
    }
  }
}

impl fmt::Display for VsGeneration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "VS{}", self.year())
  }
}

/// How an architecture is spelled for `VCVARSALL.BAT` and for the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchTokens {
  pub vcvars: &'static str,
  pub platform: &'static str,
}

impl ArchTokens {
  pub fn for_arch(arch: Arch) -> Self {
    let (vcvars, platform) = match arch {
      Arch::X64 => ("amd64", "x64"),
      Arch::X86 => ("x86", "Win32"),
      Arch::Arm64 => ("amd64_arm64", "ARM64"),
      Arch::Arm => ("amd64_arm", "ARM"),
    };
    Self { vcvars, platform }
  }
}

/// Older toolset selected inside a newer Visual Studio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolsetOverride {
  /// Value of `-vcvars_ver=`
  pub vcvars_ver: &'static str,
  /// Prefix of the `-T` toolset string, including its trailing comma
  pub toolset: &'static str,
}

impl ToolsetOverride {
  pub fn for_build(build_system: BuildSystem, compiler: Compiler) -> Option<Self> {
    match (build_system, compiler) {
      (BuildSystem::Vs2019, Compiler::Vc141) => Some(Self {
        vcvars_ver: "14.1",
        toolset: "v141,",
      }),
      (BuildSystem::Vs2019 | BuildSystem::Vs2017, Compiler::Vc140) => Some(Self {
        vcvars_ver: "14.0",
        toolset: "v140,",
      }),
      _ => None,
    }
  }
}

/// A located compiler suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainHandle {
  /// Absolute path of `VCVARSALL.BAT`
  pub vcvarsall: PathBuf,
  /// Arguments for `VCVARSALL.BAT`: the architecture token, then an optional toolset version
  pub vcvars_args: Vec<String>,
  /// Generator platform name (`-A` and MSBuild `Platform=`)
  pub platform: &'static str,
  /// Toolset prefix for `-T`, empty when the generation's default toolset is used
  pub toolset: &'static str,
}

impl ToolchainHandle {
  /// Command line that initializes the compiler environment
  pub fn init_command(&self) -> String {
    format!("@call \"{}\" {}", self.vcvarsall.display(), self.vcvars_args.join(" "))
  }
}

/// Program Files directory where 32-bit Visual Studio installs live
pub fn program_files(probe: &impl Probe, host: &Host) -> PathBuf {
  let (var, fallback) = match host.arch {
    Arch::X64 | Arch::Arm64 => ("ProgramFiles(x86)", "C:\\Program Files (x86)"),
    Arch::X86 | Arch::Arm => ("ProgramFiles", "C:\\Program Files"),
  };
  PathBuf::from(probe.env_var(var).unwrap_or_else(|| fallback.to_string()))
}

/// Find the directory holding `VCVARSALL.BAT` for `generation`
pub fn find_vcvarsall(probe: &impl Probe, host: &Host, generation: VsGeneration) -> Result<PathBuf, BuildError> {
  let program_files = program_files(probe, host);

  for rule in generation.rules() {
    for candidate in rule.candidates(probe, &program_files) {
      let vcvarsall = candidate.join(VCVARSALL);
      debug!(path = %vcvarsall.display(), "probing for {}", VCVARSALL);
      if probe.file_exists(&vcvarsall) {
        return Ok(vcvarsall);
      }
    }
  }

  Err(BuildError::ToolchainNotFound {
    generation: generation.to_string(),
  })
}

/// Locate the toolchain for one build phase.
///
/// Returns `None` off Windows.
pub fn locate(probe: &impl Probe, config: &BuildConfig) -> Result<Option<ToolchainHandle>, BuildError> {
  if !config.host.is_windows() {
    return Ok(None);
  }

  let generation =
    VsGeneration::for_build(config.build_system, config.compiler).ok_or_else(|| BuildError::IncompatibleCompiler {
      build_system: config.build_system.to_string(),
      compiler: config.compiler.to_string(),
      host: config.host.os.to_string(),
    })?;

  let vcvarsall = find_vcvarsall(probe, &config.host, generation)?;
  info!(%generation, path = %vcvarsall.display(), "found Visual C++ toolchain");

  let tokens = ArchTokens::for_arch(config.arch);
  let mut vcvars_args = vec![tokens.vcvars.to_string()];
  let mut toolset = "";
  if let Some(over) = ToolsetOverride::for_build(config.build_system, config.compiler) {
    vcvars_args.push(format!("-vcvars_ver={}", over.vcvars_ver));
    toolset = over.toolset;
  }

  Ok(Some(ToolchainHandle {
    vcvarsall,
    vcvars_args,
    platform: tokens.platform,
    toolset,
  }))
}
