//! scbuild-lib: build orchestration for CMake-based projects
//!
//! This crate turns a requested build (generator, compiler, architecture,
//! configuration) into shell scripts that configure and drive CMake:
//! - `toolchain`: finds the Visual C++ environment script on Windows
//! - `resolve`: names the build directory and plans the command lines
//! - `script`: runs a plan through a transient script file
//! - `orchestrate`: bootstraps host tools before cross-compiling

pub mod config;
pub mod consts;
pub mod error;
pub mod orchestrate;
pub mod platform;
pub mod resolve;
pub mod script;
pub mod toolchain;
pub mod util;

pub use config::{BuildConfig, BuildRequest, BuildSystem, Compiler, Configuration, ProjectLayout, ToolPaths};
pub use error::BuildError;
pub use orchestrate::{Orchestrator, Phase, needs_bootstrap};
pub use platform::{Arch, Host, Os};
pub use resolve::CommandPlan;
pub use script::{CommandScript, PlanRunner};
pub use toolchain::SystemProbe;
