/// Application name, used for default file and directory names.
pub const APP_NAME: &str = "srcbuild";

/// Build file looked up in the current directory when none is given.
pub const DEFAULT_MANIFEST: &str = "srcbuild.toml";

/// Scratch directory, relative to the current directory.
pub const DEFAULT_WORKSPACE: &str = "build-srcbuild";

/// Source host used when neither the build file nor the target names one.
pub const DEFAULT_HOST: &str = "github.com";

/// System-wide install prefix autotools uses by default.
pub const DEFAULT_PREFIX: &str = "/usr/local";

/// Identity written into the workspace repository so git tooling works offline.
pub const WORKSPACE_USER_NAME: &str = "anonymous";
pub const WORKSPACE_USER_EMAIL: &str = "anonymous@localhost";

/// Boost.Test parameters used for the primary target's unit-test binary.
pub const DEFAULT_TEST_ARGS: &[&str] = &[
  "--run_test=*",
  "--random=1",
  "--show_progress=1",
  "--detect_memory_leak=0",
  "--report_level=no",
  "--build_info=yes",
];
