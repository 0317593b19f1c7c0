//! Build matrix resolution.
//!
//! Turns one [`BuildConfig`] into the build directory it uses and the ordered
//! command lines that configure and drive the generator there. Nothing here
//! runs a command.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{BuildConfig, BuildSystem, ProjectLayout, ToolPaths};
use crate::consts::{BUILD_ROOT, CLANG_TBLGEN, LLVM_TBLGEN};
use crate::error::BuildError;
use crate::platform::Arch;
use crate::toolchain::{ArchTokens, ToolchainHandle, ToolsetOverride};

const CLANG_FORMAT_OPTION: &str = "-DSC_CLANGFORMAT=\"ON\"";

/// Ordered shell command lines, run together as one script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandPlan {
  commands: Vec<String>,
}

impl CommandPlan {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, command: impl Into<String>) {
    self.commands.push(command.into());
  }

  pub fn commands(&self) -> &[String] {
    &self.commands
  }
}

/// A plan together with the directory it must run in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlan {
  /// Absolute build directory
  pub build_dir: PathBuf,
  pub plan: CommandPlan,
}

/// Name of the build directory for `config`.
///
/// Multi-config generators share one directory across configurations, except
/// for the lint-only mode which always gets its own.
pub fn build_dir_name(config: &BuildConfig) -> String {
  let mut name = format!(
    "{}-{}-{}-{}",
    config.build_system, config.host.os, config.compiler, config.arch
  );
  if !config.build_system.is_multi_config() || config.configuration.is_lint_only() {
    name.push('-');
    name.push_str(config.configuration.as_str());
  }
  name
}

/// Build directory for `config`, relative to the project root
pub fn build_dir(config: &BuildConfig) -> PathBuf {
  Path::new(BUILD_ROOT).join(build_dir_name(config))
}

/// Absolute build directory for `config` and the commands to run in it.
///
/// Only the project root has to exist; the build directory is left for the
/// runner to create.
pub fn resolve(
  config: &BuildConfig,
  toolchain: Option<&ToolchainHandle>,
  layout: &ProjectLayout,
) -> Result<ResolvedPlan, BuildError> {
  let root = dunce::canonicalize(&layout.root).map_err(|source| BuildError::ProjectRoot {
    path: layout.root.clone(),
    source,
  })?;
  let build_dir = root.join(build_dir(config));

  let plan = plan_commands(config, toolchain, layout, &build_dir);
  for command in plan.commands() {
    debug!(command = %command, "planned");
  }

  Ok(ResolvedPlan { build_dir, plan })
}

/// Command lines for one phase, run from `build_dir`
pub fn plan_commands(
  config: &BuildConfig,
  toolchain: Option<&ToolchainHandle>,
  layout: &ProjectLayout,
  build_dir: &Path,
) -> CommandPlan {
  let mut plan = CommandPlan::new();

  // The init script may leave us anywhere, so hop back explicitly
  if let Some(toolchain) = toolchain {
    plan.push(toolchain.init_command());
    plan.push(format!("@cd /d \"{}\"", build_dir.display()));
  }

  match config.build_system {
    BuildSystem::Ninja => plan_ninja(&mut plan, config, layout),
    BuildSystem::Vs2015 | BuildSystem::Vs2017 | BuildSystem::Vs2019 => {
      plan_visual_studio(&mut plan, config, toolchain, layout)
    }
  }

  plan
}

fn plan_ninja(plan: &mut CommandPlan, config: &BuildConfig, layout: &ProjectLayout) {
  if config.host.is_windows() {
    plan.push("set CC=cl.exe");
    plan.push("set CXX=cl.exe");
  }

  let mut configure = vec!["cmake".to_string(), "-G".to_string(), config.build_system.generator().to_string()];
  if config.configuration.is_lint_only() {
    configure.push(CLANG_FORMAT_OPTION.to_string());
    configure.push(layout.source_dir.clone());
    plan.push(configure.join(" "));
    return;
  }

  configure.push(format!("-DCMAKE_BUILD_TYPE=\"{}\"", config.configuration));
  configure.push(format!("-DSC_ARCH_NAME=\"{}\"", config.arch));
  configure.extend(tool_overrides(config.tool_paths.as_ref()));
  configure.push(layout.source_dir.clone());
  plan.push(configure.join(" "));

  let jobs = config.host.parallelism;
  if config.bootstrap_tools {
    for tool in [CLANG_TBLGEN, LLVM_TBLGEN] {
      plan.push(format!("ninja {} -j{}", tool, jobs));
    }
  } else {
    plan.push(format!("ninja -j{}", jobs));
  }
}

fn plan_visual_studio(
  plan: &mut CommandPlan,
  config: &BuildConfig,
  toolchain: Option<&ToolchainHandle>,
  layout: &ProjectLayout,
) {
  let mut configure = vec!["cmake".to_string(), "-G".to_string(), config.build_system.generator().to_string()];
  if config.configuration.is_lint_only() {
    configure.push(CLANG_FORMAT_OPTION.to_string());
    configure.push(layout.source_dir.clone());
    plan.push(configure.join(" "));
    return;
  }

  let (platform, toolset) = match toolchain {
    Some(toolchain) => (toolchain.platform, toolchain.toolset),
    None => (
      ArchTokens::for_arch(config.arch).platform,
      ToolsetOverride::for_build(config.build_system, config.compiler).map_or("", |o| o.toolset),
    ),
  };
  let host_toolset = match config.host.arch {
    Arch::X86 => "x86",
    Arch::X64 | Arch::Arm64 | Arch::Arm => "x64",
  };

  configure.push(format!("-T {}host={}", toolset, host_toolset));
  configure.push(format!("-A {}", platform));
  configure.extend(tool_overrides(config.tool_paths.as_ref()));
  configure.push(layout.source_dir.clone());
  plan.push(configure.join(" "));

  let msbuild_options = format!(
    "/m:{} /v:m /p:Configuration={},Platform={}",
    config.host.parallelism, config.configuration, platform
  );
  if config.bootstrap_tools {
    for project in [&layout.clang_tblgen_project, &layout.llvm_tblgen_project] {
      plan.push(format!("MSBuild {} /nologo {}", project, msbuild_options));
    }
  } else {
    plan.push(format!("MSBuild ALL_BUILD.vcxproj /nologo {}", msbuild_options));
  }
}

/// CMake cache overrides pointing the build at prebuilt helper tools
fn tool_overrides(tool_paths: Option<&ToolPaths>) -> Vec<String> {
  match tool_paths {
    Some(paths) => vec![
      format!("-DCLANG_TABLEGEN=\"{}\"", paths.clang_tblgen.display()),
      format!("-DLLVM_TABLEGEN=\"{}\"", paths.llvm_tblgen.display()),
    ],
    None => Vec::new(),
  }
}

/// Where a phase building in `build_dir` leaves the helper tools
pub fn helper_tool_paths(config: &BuildConfig, layout: &ProjectLayout, build_dir: &Path) -> ToolPaths {
  let mut bin = build_dir.join(&layout.tools_subdir);
  if config.build_system.is_multi_config() {
    bin.push(config.configuration.as_str());
  }
  bin.push("bin");

  let suffix = config.host.os.exe_suffix();
  ToolPaths {
    clang_tblgen: bin.join(format!("{}{}", CLANG_TBLGEN, suffix)),
    llvm_tblgen: bin.join(format!("{}{}", LLVM_TBLGEN, suffix)),
  }
}
