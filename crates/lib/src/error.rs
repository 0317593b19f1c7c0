//! Error types for scbuild-lib

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::orchestrate::Phase;

/// Errors that can occur while resolving or running a build.
///
/// None of these are recoverable at the library level; callers are expected to
/// report them and stop.
#[derive(Debug, Error)]
pub enum BuildError {
  /// No installed compiler suite matches the request.
  #[error("Could NOT find {generation}.")]
  ToolchainNotFound { generation: String },

  /// Architecture token is absent from the supported table.
  #[error("Unsupported architecture: {0}")]
  UnsupportedArchitecture(String),

  /// The machine running the build is not one we know how to drive.
  #[error("Unknown host {0}")]
  UnsupportedHost(String),

  #[error("Unsupported build system: {0}")]
  UnsupportedBuildSystem(String),

  #[error("Unsupported compiler: {0}")]
  UnsupportedCompiler(String),

  #[error("Unsupported configuration: {0}")]
  UnsupportedConfiguration(String),

  /// The build system and compiler pair cannot be used together on this host.
  #[error("{build_system} cannot build with {compiler} on {host}")]
  IncompatibleCompiler {
    build_system: String,
    compiler: String,
    host: String,
  },

  /// The generated script exited unsuccessfully.
  #[error("Build failed during {phase} phase (exit code {code:?})")]
  BuildFailed { phase: Phase, code: Option<i32> },

  #[error("failed to resolve project root {}: {source}", path.display())]
  ProjectRoot {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to create build directory {}: {source}", path.display())]
  CreateBuildDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write build script {}: {source}", path.display())]
  WriteScript {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to run build script {}: {source}", path.display())]
  SpawnScript {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}
