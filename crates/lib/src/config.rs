//! Build matrix inputs.
//!
//! A [`BuildRequest`] is what the user asked for. Each phase of a build turns it
//! into a [`BuildConfig`], which is immutable once constructed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{CLANG_TBLGEN, LLVM_TBLGEN};
use crate::error::BuildError;
use crate::platform::{Arch, Host, Os};

/// Build-file generator driven by CMake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildSystem {
  Ninja,
  Vs2015,
  Vs2017,
  Vs2019,
}

impl BuildSystem {
  /// Default generator for a host platform
  pub fn default_for(os: Os) -> Self {
    match os {
      Os::Win => Self::Vs2019,
      Os::Linux | Os::Osx => Self::Ninja,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Ninja => "ninja",
      Self::Vs2015 => "vs2015",
      Self::Vs2017 => "vs2017",
      Self::Vs2019 => "vs2019",
    }
  }

  /// Value passed to `cmake -G`
  pub fn generator(&self) -> &'static str {
    match self {
      Self::Ninja => "Ninja",
      Self::Vs2015 => "\"Visual Studio 14\"",
      Self::Vs2017 => "\"Visual Studio 15\"",
      Self::Vs2019 => "\"Visual Studio 16\"",
    }
  }

  /// Visual Studio generators hold every configuration in one build directory
  pub fn is_multi_config(&self) -> bool {
    !matches!(self, Self::Ninja)
  }
}

impl fmt::Display for BuildSystem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildSystem {
  type Err = BuildError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "ninja" => Ok(Self::Ninja),
      "vs2015" => Ok(Self::Vs2015),
      "vs2017" => Ok(Self::Vs2017),
      "vs2019" => Ok(Self::Vs2019),
      other => Err(BuildError::UnsupportedBuildSystem(other.to_string())),
    }
  }
}

/// Compiler suite, named by toolset version for Visual C++
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compiler {
  Vc140,
  Vc141,
  Vc142,
  Gcc,
  Clang,
}

impl Compiler {
  /// Default compiler for a generator on a host platform
  pub fn default_for(build_system: BuildSystem, os: Os) -> Self {
    match (build_system, os) {
      (BuildSystem::Vs2015, _) => Self::Vc140,
      (BuildSystem::Vs2017, _) => Self::Vc141,
      (BuildSystem::Vs2019, _) | (BuildSystem::Ninja, Os::Win) => Self::Vc142,
      (BuildSystem::Ninja, _) => Self::Gcc,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Vc140 => "vc140",
      Self::Vc141 => "vc141",
      Self::Vc142 => "vc142",
      Self::Gcc => "gcc",
      Self::Clang => "clang",
    }
  }

  pub fn is_msvc(&self) -> bool {
    matches!(self, Self::Vc140 | Self::Vc141 | Self::Vc142)
  }
}

impl fmt::Display for Compiler {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Compiler {
  type Err = BuildError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "vc140" => Ok(Self::Vc140),
      "vc141" => Ok(Self::Vc141),
      "vc142" => Ok(Self::Vc142),
      "gcc" => Ok(Self::Gcc),
      "clang" => Ok(Self::Clang),
      other => Err(BuildError::UnsupportedCompiler(other.to_string())),
    }
  }
}

/// Optimization profile, or the format-check-only mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Configuration {
  Debug,
  #[default]
  Release,
  RelWithDebInfo,
  MinSizeRel,
  ClangFormat,
}

impl Configuration {
  /// Name as understood by CMake and MSBuild
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "Debug",
      Self::Release => "Release",
      Self::RelWithDebInfo => "RelWithDebInfo",
      Self::MinSizeRel => "MinSizeRel",
      Self::ClangFormat => "clangformat",
    }
  }

  /// Lint-only runs configure with a single option and build nothing
  pub fn is_lint_only(&self) -> bool {
    matches!(self, Self::ClangFormat)
  }
}

impl fmt::Display for Configuration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Configuration {
  type Err = BuildError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "debug" => Ok(Self::Debug),
      "release" => Ok(Self::Release),
      "relwithdebinfo" => Ok(Self::RelWithDebInfo),
      "minsizerel" => Ok(Self::MinSizeRel),
      "clangformat" => Ok(Self::ClangFormat),
      _ => Err(BuildError::UnsupportedConfiguration(s.to_string())),
    }
  }
}

/// Absolute paths of the two host-native code generators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
  pub clang_tblgen: PathBuf,
  pub llvm_tblgen: PathBuf,
}

/// What the user asked to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildRequest {
  pub build_system: BuildSystem,
  pub compiler: Compiler,
  pub arch: Arch,
  pub configuration: Configuration,
}

impl BuildRequest {
  /// Reject build system and compiler pairs that cannot work on `host`.
  ///
  /// Must run before any toolchain lookup.
  pub fn validate(&self, host: &Host) -> Result<(), BuildError> {
    use BuildSystem::*;
    use Compiler::*;

    let compatible = match (self.build_system, host.os) {
      (Ninja, Os::Win) => self.compiler.is_msvc(),
      (Ninja, _) => matches!(self.compiler, Gcc | Clang),
      (_, Os::Linux | Os::Osx) => false,
      (Vs2015, Os::Win) => self.compiler == Vc140,
      (Vs2017, Os::Win) => matches!(self.compiler, Vc140 | Vc141),
      (Vs2019, Os::Win) => self.compiler.is_msvc(),
    };

    if compatible {
      Ok(())
    } else {
      Err(BuildError::IncompatibleCompiler {
        build_system: self.build_system.to_string(),
        compiler: self.compiler.to_string(),
        host: host.os.to_string(),
      })
    }
  }
}

/// Input to one build phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
  pub host: Host,
  pub build_system: BuildSystem,
  pub compiler: Compiler,
  /// Target architecture
  pub arch: Arch,
  pub configuration: Configuration,
  /// Build only the two helper tools instead of the whole project
  pub bootstrap_tools: bool,
  /// Helper tools built by a previous bootstrap phase
  pub tool_paths: Option<ToolPaths>,
}

impl BuildConfig {
  /// Config for the phase that builds the helper tools for the host
  pub fn bootstrap(host: Host, request: &BuildRequest) -> Self {
    Self {
      host,
      build_system: request.build_system,
      compiler: request.compiler,
      arch: host.arch,
      configuration: request.configuration,
      bootstrap_tools: true,
      tool_paths: None,
    }
  }

  /// Config for the phase that builds the real target
  pub fn target(host: Host, request: &BuildRequest, tool_paths: Option<ToolPaths>) -> Self {
    Self {
      host,
      build_system: request.build_system,
      compiler: request.compiler,
      arch: request.arch,
      configuration: request.configuration,
      bootstrap_tools: false,
      tool_paths,
    }
  }
}

/// Where things live in the project being built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
  /// Directory holding `Build/`
  pub root: PathBuf,
  /// Source tree, relative to a build directory
  pub source_dir: String,
  /// Subproject producing the helper tools, relative to a build directory
  pub tools_subdir: PathBuf,
  pub clang_tblgen_project: String,
  pub llvm_tblgen_project: String,
}

impl ProjectLayout {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      source_dir: "../../".to_string(),
      tools_subdir: Path::new("External").join("DirectXShaderCompiler"),
      clang_tblgen_project: format!(
        "External\\DirectXShaderCompiler\\tools\\clang\\utils\\TableGen\\{}.vcxproj",
        CLANG_TBLGEN
      ),
      llvm_tblgen_project: format!("External\\DirectXShaderCompiler\\utils\\TableGen\\{}.vcxproj", LLVM_TBLGEN),
    }
  }
}

impl Default for ProjectLayout {
  fn default() -> Self {
    Self::new(".")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(build_system: BuildSystem, compiler: Compiler) -> BuildRequest {
    BuildRequest {
      build_system,
      compiler,
      arch: Arch::X64,
      configuration: Configuration::Release,
    }
  }

  const WIN: Host = Host {
    os: Os::Win,
    arch: Arch::X64,
    parallelism: 4,
  };

  const LINUX: Host = Host {
    os: Os::Linux,
    arch: Arch::X64,
    parallelism: 4,
  };

  #[test]
  fn defaults_follow_host_platform() {
    assert_eq!(BuildSystem::default_for(Os::Win), BuildSystem::Vs2019);
    assert_eq!(BuildSystem::default_for(Os::Osx), BuildSystem::Ninja);
    assert_eq!(Compiler::default_for(BuildSystem::Vs2017, Os::Win), Compiler::Vc141);
    assert_eq!(Compiler::default_for(BuildSystem::Ninja, Os::Win), Compiler::Vc142);
    assert_eq!(Compiler::default_for(BuildSystem::Ninja, Os::Linux), Compiler::Gcc);
  }

  #[test]
  fn configuration_parses_case_insensitively() {
    assert_eq!("release".parse::<Configuration>().unwrap(), Configuration::Release);
    assert_eq!("RELWITHDEBINFO".parse::<Configuration>().unwrap(), Configuration::RelWithDebInfo);
    assert_eq!("ClangFormat".parse::<Configuration>().unwrap(), Configuration::ClangFormat);
    assert!("Profile".parse::<Configuration>().is_err());
  }

  #[test]
  fn older_visual_studio_rejects_newer_toolsets() {
    assert!(request(BuildSystem::Vs2015, Compiler::Vc140).validate(&WIN).is_ok());
    assert!(request(BuildSystem::Vs2015, Compiler::Vc141).validate(&WIN).is_err());
    assert!(request(BuildSystem::Vs2017, Compiler::Vc141).validate(&WIN).is_ok());
    assert!(request(BuildSystem::Vs2017, Compiler::Vc142).validate(&WIN).is_err());
    assert!(request(BuildSystem::Vs2019, Compiler::Vc140).validate(&WIN).is_ok());
  }

  #[test]
  fn visual_studio_generators_require_windows() {
    let err = request(BuildSystem::Vs2019, Compiler::Vc142).validate(&LINUX).unwrap_err();
    assert!(matches!(err, BuildError::IncompatibleCompiler { .. }));
  }

  #[test]
  fn ninja_compiler_depends_on_host() {
    assert!(request(BuildSystem::Ninja, Compiler::Gcc).validate(&LINUX).is_ok());
    assert!(request(BuildSystem::Ninja, Compiler::Clang).validate(&LINUX).is_ok());
    assert!(request(BuildSystem::Ninja, Compiler::Vc142).validate(&LINUX).is_err());
    assert!(request(BuildSystem::Ninja, Compiler::Vc141).validate(&WIN).is_ok());
    assert!(request(BuildSystem::Ninja, Compiler::Gcc).validate(&WIN).is_err());
  }

  #[test]
  fn bootstrap_config_targets_host_without_tools() {
    let host = Host::new(Os::Linux, Arch::X64, 2);
    let mut req = request(BuildSystem::Ninja, Compiler::Gcc);
    req.arch = Arch::Arm64;

    let config = BuildConfig::bootstrap(host, &req);
    assert_eq!(config.arch, Arch::X64);
    assert!(config.bootstrap_tools);
    assert!(config.tool_paths.is_none());

    let config = BuildConfig::target(host, &req, None);
    assert_eq!(config.arch, Arch::Arm64);
    assert!(!config.bootstrap_tools);
  }

  #[test]
  fn tool_paths_serialize_by_tool_name() {
    let paths = ToolPaths {
      clang_tblgen: PathBuf::from("/b/bin/clang-tblgen"),
      llvm_tblgen: PathBuf::from("/b/bin/llvm-tblgen"),
    };
    let json = serde_json::to_value(&paths).unwrap();
    assert_eq!(json["clang_tblgen"], "/b/bin/clang-tblgen");
    assert_eq!(json["llvm_tblgen"], "/b/bin/llvm-tblgen");

    let back: ToolPaths = serde_json::from_value(json).unwrap();
    assert_eq!(back, paths);
  }
}
