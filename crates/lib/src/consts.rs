//! Fixed names shared across the crate.

/// Directory, relative to the project root, that holds every build directory
pub const BUILD_ROOT: &str = "Build";

/// File stem of the transient script written into a build directory
pub const SCRIPT_STEM: &str = "scBuild";

/// Environment-initialization entry point shipped with Visual C++
pub const VCVARSALL: &str = "VCVARSALL.BAT";

pub const CLANG_TBLGEN: &str = "clang-tblgen";
pub const LLVM_TBLGEN: &str = "llvm-tblgen";
