//! Test utilities for scbuild-lib.
//!
//! Stand-ins for the outside world: a fake machine to probe for toolchains and
//! a runner that records plans instead of executing them.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::error::BuildError;
use crate::resolve::CommandPlan;
use crate::script::PlanRunner;
use crate::toolchain::Probe;

/// Machine with a fixed set of files, environment variables and vswhere answers
#[derive(Debug, Default)]
pub struct FakeMachine {
  files: HashSet<PathBuf>,
  env: HashMap<String, String>,
  installations: HashMap<u32, PathBuf>,
}

impl FakeMachine {
  pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
    self.files.insert(path.into());
    self
  }

  pub fn with_env(mut self, name: &str, value: &str) -> Self {
    self.env.insert(name.to_string(), value.to_string());
    self
  }

  /// Have vswhere report `path` for `major`
  pub fn with_installation(mut self, major: u32, path: &str) -> Self {
    self.installations.insert(major, PathBuf::from(path));
    self
  }
}

impl Probe for FakeMachine {
  fn file_exists(&self, path: &Path) -> bool {
    self.files.contains(path)
  }

  fn env_var(&self, name: &str) -> Option<String> {
    self.env.get(name).cloned()
  }

  fn installation_path(&self, _vswhere: &Path, major: u32) -> Option<PathBuf> {
    self.installations.get(&major).cloned()
  }
}

#[derive(Debug, Clone)]
pub struct RecordedRun {
  pub plan: CommandPlan,
  pub dir: PathBuf,
}

/// Runner that records every plan and answers with queued exit codes.
///
/// Once the queue is empty every run succeeds.
#[derive(Debug, Default)]
pub struct RecordingRunner {
  runs: RefCell<Vec<RecordedRun>>,
  codes: RefCell<VecDeque<Option<i32>>>,
}

impl RecordingRunner {
  pub fn with_codes(codes: impl IntoIterator<Item = Option<i32>>) -> Self {
    Self {
      runs: RefCell::default(),
      codes: RefCell::new(codes.into_iter().collect()),
    }
  }

  pub fn runs(&self) -> Vec<RecordedRun> {
    self.runs.borrow().clone()
  }
}

impl PlanRunner for RecordingRunner {
  async fn run(&self, plan: &CommandPlan, dir: &Path) -> Result<Option<i32>, BuildError> {
    self.runs.borrow_mut().push(RecordedRun {
      plan: plan.clone(),
      dir: dir.to_path_buf(),
    });
    Ok(self.codes.borrow_mut().pop_front().unwrap_or(Some(0)))
  }
}
