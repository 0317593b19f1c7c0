mod cmd;
mod output;
mod prompts;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cmd::BuildArgs;
use crate::output::{OutputFormat, print_error};

/// Configure and build a CMake project for a platform, compiler and architecture
#[derive(Parser)]
#[command(name = "scbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Generator: ninja, vs2015, vs2017 or vs2019 (default: vs2019 on Windows, ninja elsewhere)
  build_system: Option<String>,

  /// Compiler: vc140, vc141, vc142, gcc or clang (default depends on the generator)
  compiler: Option<String>,

  /// Target architecture: x64, x86, arm64 or arm (default: host architecture)
  arch: Option<String>,

  /// Configuration: Debug, Release, RelWithDebInfo, MinSizeRel or clangformat
  configuration: Option<String>,

  /// Print the planned commands instead of running them
  #[arg(long)]
  dry_run: bool,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,

  /// Output format
  #[arg(short, long, value_enum, default_value_t)]
  output: OutputFormat,
}

fn main() {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if cli.verbose {
      EnvFilter::new("debug")
    } else {
      EnvFilter::new("info")
    }
  });
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let args = BuildArgs {
    build_system: cli.build_system,
    compiler: cli.compiler,
    arch: cli.arch,
    configuration: cli.configuration,
  };

  if let Err(e) = cmd::cmd_build(&args, cli.dry_run, cli.output) {
    print_error(&format!("{:#}", e));
    let _ = prompts::pause();
    std::process::exit(1);
  }
}
