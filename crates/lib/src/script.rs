//! Transient build scripts.
//!
//! A [`CommandPlan`] is written to a single script in the build directory, run
//! as a child process, and removed again no matter how the run ends. The build
//! directory is created on first use.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::consts::SCRIPT_STEM;
use crate::error::BuildError;
use crate::platform::Os;
use crate::resolve::CommandPlan;

/// Runs a command plan from a working directory.
///
/// `dir` may not exist yet; runners that touch the filesystem create it.
///
/// Returns the raw exit code (`None` if the process was killed by a signal);
/// deciding whether it is fatal is left to the caller.
#[allow(async_fn_in_trait)]
pub trait PlanRunner {
  async fn run(&self, plan: &CommandPlan, dir: &Path) -> Result<Option<i32>, BuildError>;
}

/// Script dialect understood by the platform command interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
  Batch,
  Posix,
}

impl ScriptKind {
  pub fn for_os(os: Os) -> Self {
    match os {
      Os::Win => Self::Batch,
      Os::Linux | Os::Osx => Self::Posix,
    }
  }

  pub fn extension(&self) -> &'static str {
    match self {
      Self::Batch => "bat",
      Self::Posix => "sh",
    }
  }

  /// Lines written before the plan's commands
  pub fn header(&self) -> &'static [&'static str] {
    match self {
      Self::Batch => &[],
      Self::Posix => &["#!/bin/sh", "set -e"],
    }
  }

  /// One script line for `command`.
  ///
  /// Batch build commands exit the script with their error level on failure.
  /// Quiet `@` lines and `set` assignments are written as-is, since a trailing
  /// `||` would become part of the assigned value.
  pub fn line(&self, command: &str) -> String {
    match self {
      Self::Batch if !command.starts_with('@') && !command.starts_with("set ") => {
        format!("{} || exit /b", command)
      }
      Self::Batch | Self::Posix => command.to_string(),
    }
  }

  /// Full script text for `plan`, one command per line.
  ///
  /// The script stops at the first failing command and exits with its code.
  pub fn render(&self, plan: &CommandPlan) -> String {
    let mut script = String::new();
    for line in self.header() {
      script.push_str(line);
      script.push('\n');
    }
    for command in plan.commands() {
      script.push_str(&self.line(command));
      script.push('\n');
    }
    script
  }
}

/// Location of the transient script inside `dir`
pub fn script_path(kind: ScriptKind, dir: &Path) -> PathBuf {
  dir.join(format!("{}.{}", SCRIPT_STEM, kind.extension()))
}

/// Executes plans through a transient script file
#[derive(Debug, Clone, Copy)]
pub struct CommandScript {
  kind: ScriptKind,
}

impl CommandScript {
  pub fn new(os: Os) -> Self {
    Self {
      kind: ScriptKind::for_os(os),
    }
  }
}

impl PlanRunner for CommandScript {
  async fn run(&self, plan: &CommandPlan, dir: &Path) -> Result<Option<i32>, BuildError> {
    tokio::fs::create_dir_all(dir)
      .await
      .map_err(|source| BuildError::CreateBuildDir {
        path: dir.to_path_buf(),
        source,
      })?;

    let path = script_path(self.kind, dir);
    let script = ScriptFile::write(&path, &self.kind.render(plan)).await?;

    let mut command = match self.kind {
      ScriptKind::Batch => {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(script.path());
        command
      }
      ScriptKind::Posix => {
        script.make_executable().await?;
        let mut command = Command::new("/bin/sh");
        command.arg(script.path());
        command
      }
    };
    command.current_dir(dir);

    info!(script = %script.path().display(), commands = plan.commands().len(), "running build script");
    let status = command.status().await.map_err(|source| BuildError::SpawnScript {
      path: script.path().to_path_buf(),
      source,
    })?;
    debug!(code = ?status.code(), "build script exited");

    Ok(status.code())
  }
}

/// Script on disk, removed when dropped
struct ScriptFile {
  path: PathBuf,
}

impl ScriptFile {
  async fn write(path: &Path, contents: &str) -> Result<Self, BuildError> {
    // Own the path before writing so a partial write is cleaned up too
    let file = Self {
      path: path.to_path_buf(),
    };
    tokio::fs::write(&file.path, contents)
      .await
      .map_err(|source| BuildError::WriteScript {
        path: file.path.clone(),
        source,
      })?;
    Ok(file)
  }

  fn path(&self) -> &Path {
    &self.path
  }

  #[cfg(unix)]
  async fn make_executable(&self) -> Result<(), BuildError> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(&self.path, Permissions::from_mode(0o755))
      .await
      .map_err(|source| BuildError::WriteScript {
        path: self.path.clone(),
        source,
      })
  }

  #[cfg(not(unix))]
  async fn make_executable(&self) -> Result<(), BuildError> {
    Ok(())
  }
}

impl Drop for ScriptFile {
  fn drop(&mut self) {
    if let Err(e) = std::fs::remove_file(&self.path)
      && e.kind() != std::io::ErrorKind::NotFound
    {
      warn!(path = %self.path.display(), error = %e, "failed to remove build script");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn plan(commands: &[&str]) -> CommandPlan {
    let mut plan = CommandPlan::new();
    for command in commands {
      plan.push(*command);
    }
    plan
  }

  fn host_runner() -> (CommandScript, ScriptKind) {
    let os = Os::current().unwrap();
    (CommandScript::new(os), ScriptKind::for_os(os))
  }

  #[test]
  fn render_puts_one_command_per_line() {
    let p = plan(&["cmake ../../", "ninja -j4"]);
    assert_eq!(ScriptKind::Posix.render(&p), "#!/bin/sh\nset -e\ncmake ../../\nninja -j4\n");
    assert_eq!(ScriptKind::Batch.render(&p), "cmake ../../ || exit /b\nninja -j4 || exit /b\n");
  }

  #[test]
  fn batch_leaves_setup_lines_unguarded() {
    let p = plan(&["@call \"C:\\VS\\VCVARSALL.BAT\" amd64", "set CC=cl.exe", "ninja -j4"]);
    assert_eq!(
      ScriptKind::Batch.render(&p),
      "@call \"C:\\VS\\VCVARSALL.BAT\" amd64\nset CC=cl.exe\nninja -j4 || exit /b\n"
    );
  }

  #[test]
  fn script_name_is_fixed_per_platform() {
    let dir = Path::new("build");
    assert_eq!(script_path(ScriptKind::Batch, dir), dir.join("scBuild.bat"));
    assert_eq!(script_path(ScriptKind::Posix, dir), dir.join("scBuild.sh"));
  }

  #[tokio::test]
  async fn runs_commands_in_build_directory_and_cleans_up() {
    let temp = TempDir::new().unwrap();
    let (runner, kind) = host_runner();

    let code = runner.run(&plan(&["echo built> marker.txt"]), temp.path()).await.unwrap();

    assert_eq!(code, Some(0));
    assert!(temp.path().join("marker.txt").exists());
    assert!(!script_path(kind, temp.path()).exists());
  }

  #[tokio::test]
  async fn failing_script_returns_code_and_cleans_up() {
    let temp = TempDir::new().unwrap();
    let (runner, kind) = host_runner();

    let code = runner.run(&plan(&["exit 7"]), temp.path()).await.unwrap();

    assert_eq!(code, Some(7));
    assert!(!script_path(kind, temp.path()).exists());
  }

  #[tokio::test]
  async fn exit_stops_the_script() {
    let temp = TempDir::new().unwrap();
    let (runner, _) = host_runner();

    let code = runner.run(&plan(&["exit 3", "echo unreachable"]), temp.path()).await.unwrap();
    assert_eq!(code, Some(3));
  }

  #[tokio::test]
  async fn failing_command_is_not_masked_by_later_success() {
    let temp = TempDir::new().unwrap();
    let (runner, _) = host_runner();

    let code = runner.run(&plan(&["false", "true"]), temp.path()).await.unwrap();
    assert_ne!(code, Some(0));
  }

  #[cfg(unix)]
  #[tokio::test]
  async fn first_failing_tool_build_stops_the_script() {
    let temp = TempDir::new().unwrap();
    let runner = CommandScript::new(Os::Linux);

    let code = runner
      .run(
        &plan(&["fail() { return 9; }", "fail", "echo built > llvm-tblgen.txt"]),
        temp.path(),
      )
      .await
      .unwrap();

    assert_eq!(code, Some(9));
    assert!(!temp.path().join("llvm-tblgen.txt").exists());
  }

  #[tokio::test]
  async fn creates_missing_build_directory() {
    let temp = TempDir::new().unwrap();
    let (runner, kind) = host_runner();
    let dir = temp.path().join("Build").join("ninja-linux-gcc-x64-Release");

    let code = runner.run(&plan(&["echo hi"]), &dir).await.unwrap();

    assert_eq!(code, Some(0));
    assert!(dir.is_dir());
    assert!(!script_path(kind, &dir).exists());
  }

  #[tokio::test]
  async fn unusable_directory_is_a_create_error() {
    let temp = TempDir::new().unwrap();
    let (runner, _) = host_runner();
    let blocker = temp.path().join("Build");
    std::fs::write(&blocker, "").unwrap();

    let result = runner.run(&plan(&["echo hi"]), &blocker.join("sub")).await;
    assert!(matches!(result, Err(BuildError::CreateBuildDir { .. })));
  }
}
