//! Implementation of the build command.
//!
//! Fills in defaults for whatever the user left out, then runs the build for
//! the current directory, bootstrapping host tools when cross compiling.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use scbuild_lib::{
  Arch, BuildError, BuildRequest, BuildSystem, CommandPlan, CommandScript, Compiler, Configuration, Host,
  Orchestrator, PlanRunner, ProjectLayout, SystemProbe, ToolPaths, needs_bootstrap,
};

use crate::output::{OutputFormat, format_elapsed, print_info, print_json, print_stat, print_success, symbols};

/// Positional inputs as given on the command line
#[derive(Debug, Default, Clone)]
pub struct BuildArgs {
  pub build_system: Option<String>,
  pub compiler: Option<String>,
  pub arch: Option<String>,
  pub configuration: Option<String>,
}

#[derive(Debug, Serialize)]
struct BuildSummary {
  host: String,
  build_system: String,
  compiler: String,
  arch: String,
  configuration: String,
  bootstrapped: bool,
  dry_run: bool,
  elapsed_ms: u64,
  tools: ToolPaths,
}

/// Apply platform defaults to the arguments and parse them
pub fn build_request(host: &Host, args: &BuildArgs) -> Result<BuildRequest, BuildError> {
  let build_system = match &args.build_system {
    Some(s) => s.parse()?,
    None => BuildSystem::default_for(host.os),
  };
  let compiler = match &args.compiler {
    Some(s) => s.parse()?,
    None => Compiler::default_for(build_system, host.os),
  };
  let arch = match &args.arch {
    Some(s) => s.parse::<Arch>()?,
    None => host.arch,
  };
  let configuration = match &args.configuration {
    Some(s) => s.parse()?,
    None => Configuration::default(),
  };

  Ok(BuildRequest {
    build_system,
    compiler,
    arch,
    configuration,
  })
}

/// Runner that shows each plan instead of executing it
struct PrintPlan {
  output: OutputFormat,
}

impl PlanRunner for PrintPlan {
  async fn run(&self, plan: &CommandPlan, dir: &Path) -> Result<Option<i32>, BuildError> {
    // Keep stdout clean for the JSON summary
    if self.output.is_json() {
      eprintln!("{} {}", symbols::ARROW, dir.display());
      for command in plan.commands() {
        eprintln!("    {}", command);
      }
    } else {
      print_info(&format!("{} {}", symbols::ARROW, dir.display()));
      for command in plan.commands() {
        println!("    {}", command);
      }
    }
    Ok(Some(0))
  }
}

/// Execute the build command.
pub fn cmd_build(args: &BuildArgs, dry_run: bool, output: OutputFormat) -> Result<()> {
  let host = Host::detect()?;
  let request = build_request(&host, args)?;
  debug!(?host, ?request, "resolved build request");

  let root = std::env::current_dir().context("Failed to determine current directory")?;
  let layout = ProjectLayout::new(root);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let started = Instant::now();
  let tools = if dry_run {
    let orchestrator = Orchestrator::new(host, layout, SystemProbe, PrintPlan { output });
    rt.block_on(orchestrator.build(&request))?
  } else {
    let orchestrator = Orchestrator::new(host, layout, SystemProbe, CommandScript::new(host.os));
    rt.block_on(orchestrator.build(&request))?
  };
  let elapsed = started.elapsed();

  if output.is_json() {
    return print_json(&BuildSummary {
      host: host.to_string(),
      build_system: request.build_system.to_string(),
      compiler: request.compiler.to_string(),
      arch: request.arch.to_string(),
      configuration: request.configuration.to_string(),
      bootstrapped: needs_bootstrap(host.arch, request.arch, request.configuration),
      dry_run,
      elapsed_ms: elapsed.as_millis() as u64,
      tools,
    });
  }

  let verb = if dry_run { "Planned" } else { "Built" };
  print_success(&format!(
    "{} {}-{}-{}-{} in {}",
    verb,
    request.build_system,
    request.compiler,
    request.arch,
    request.configuration,
    format_elapsed(elapsed)
  ));
  print_stat("clang-tblgen", &tools.clang_tblgen.display().to_string());
  print_stat("llvm-tblgen", &tools.llvm_tblgen.display().to_string());

  Ok(())
}
