//! Two-phase cross-compile orchestration.
//!
//! Building for an architecture the host cannot run needs `clang-tblgen` and
//! `llvm-tblgen` built for the host first. The orchestrator runs that bootstrap
//! phase when required, then the target phase pointed at the bootstrapped tools.
//! Both phases go through [`Orchestrator::run_phase`] with their own config.

use std::fmt;
use std::time::Instant;

use tracing::info;

use crate::config::{BuildConfig, BuildRequest, Configuration, ProjectLayout, ToolPaths};
use crate::error::BuildError;
use crate::platform::{Arch, Host};
use crate::resolve::{self, helper_tool_paths};
use crate::script::PlanRunner;
use crate::toolchain::{self, Probe};

/// One invocation of the generator within a build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  /// Host-architecture build of the helper tools only
  Bootstrap,
  /// Full build for the requested architecture
  Target,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Phase::Bootstrap => write!(f, "bootstrap"),
      Phase::Target => write!(f, "target"),
    }
  }
}

/// Host/target pairs whose toolchain runs tools built for either side.
///
/// This is policy, kept to the single pair known to work.
const BOOTSTRAP_EXEMPT: &[(Arch, Arch)] = &[(Arch::X64, Arch::X86)];

/// Whether a host-architecture bootstrap phase must run before the target build
pub fn needs_bootstrap(host: Arch, target: Arch, configuration: Configuration) -> bool {
  !configuration.is_lint_only() && host != target && !BOOTSTRAP_EXEMPT.contains(&(host, target))
}

/// Drives a complete build
pub struct Orchestrator<P, R> {
  host: Host,
  layout: ProjectLayout,
  probe: P,
  runner: R,
}

impl<P: Probe, R: PlanRunner> Orchestrator<P, R> {
  pub fn new(host: Host, layout: ProjectLayout, probe: P, runner: R) -> Self {
    Self {
      host,
      layout,
      probe,
      runner,
    }
  }

  #[cfg(test)]
  fn runner(&self) -> &R {
    &self.runner
  }

  /// Build `request`, bootstrapping host tools first when cross compiling.
  ///
  /// Returns the target build's helper tool paths. They only exist on disk if
  /// that phase built them, i.e. when the target is the host architecture.
  pub async fn build(&self, request: &BuildRequest) -> Result<ToolPaths, BuildError> {
    request.validate(&self.host)?;

    let tool_paths = if needs_bootstrap(self.host.arch, request.arch, request.configuration) {
      info!(host = %self.host.arch, target = %request.arch, "cross compiling, building host tools first");
      let config = BuildConfig::bootstrap(self.host, request);
      Some(self.run_phase(Phase::Bootstrap, &config).await?)
    } else {
      None
    };

    let config = BuildConfig::target(self.host, request, tool_paths);
    self.run_phase(Phase::Target, &config).await
  }

  /// Locate, resolve and run one phase, returning where its helper tools land
  pub async fn run_phase(&self, phase: Phase, config: &BuildConfig) -> Result<ToolPaths, BuildError> {
    let started = Instant::now();

    let toolchain = toolchain::locate(&self.probe, config)?;
    let resolved = resolve::resolve(config, toolchain.as_ref(), &self.layout)?;
    info!(%phase, dir = %resolved.build_dir.display(), "building");

    let code = self.runner.run(&resolved.plan, &resolved.build_dir).await?;
    if code != Some(0) {
      return Err(BuildError::BuildFailed { phase, code });
    }

    info!(%phase, elapsed_ms = started.elapsed().as_millis() as u64, "phase finished");
    Ok(helper_tool_paths(config, &self.layout, &resolved.build_dir))
  }
}
