//! Shared test helpers for CLI integration tests.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Configure script that records its arguments.
pub const RECORDING_CONFIGURE: &str = "#!/bin/sh\necho \"$@\" > configure.args\n";

/// Isolated test environment.
///
/// Lays out a fake primary checkout, an install prefix and a `bin/` of
/// stand-in tools under one temporary directory.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };

    env.write_script("checkout/autogen.sh", "#!/bin/sh\ntouch autogen.ran\n");
    env.write_script("checkout/configure", RECORDING_CONFIGURE);

    let make = format!(
      "#!/bin/sh\necho \"$@\" >> make.log\nif [ \"$1\" = install ]; then\n  mkdir -p '{prefix}/lib' && touch '{prefix}/lib/libfoo.so.1'\nfi\n",
      prefix = env.prefix().display()
    );
    env.write_script("bin/make", &make);

    let smoke = format!("#!/bin/sh\ntouch '{}'\n", env.root().join("smoke.ran").display());
    env.write_script("bin/smoke", &smoke);

    env
  }

  /// Canonical root of the environment.
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  /// Checkout of the primary target (the working directory of the run).
  pub fn checkout(&self) -> PathBuf {
    self.root().join("checkout")
  }

  pub fn prefix(&self) -> PathBuf {
    self.root().join("prefix")
  }

  pub fn workspace(&self) -> PathBuf {
    self.root().join("ws")
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.root().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Write an executable shell script relative to the temp directory.
  pub fn write_script(&self, relative_path: &str, content: &str) {
    let path = self.write_file(relative_path, content);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  }

  /// Write the build file, with `settings` spliced into the top-level keys.
  pub fn write_build_file(&self, settings: &str) -> PathBuf {
    let bin = self.root().join("bin");
    let content = format!(
      r#"
prefix = "{prefix}"
workspace = "{workspace}"
jobs = 2
refresh_linker_cache = false
primary = "libfoo"
{settings}

[tools]
make = "{make}"

[[target]]
account = "example"
repo = "libfoo"
branch = "master"
options = ["--x=1", "--x=2"]
footprint = ["lib/libfoo*"]

[verify]
smoke = ["{smoke}"]
"#,
      prefix = self.prefix().display(),
      workspace = self.workspace().display(),
      make = bin.join("make").display(),
      smoke = bin.join("smoke").display(),
    );
    self.write_file("srcbuild.toml", &content)
  }

  /// Read a file relative to the temp directory.
  pub fn read(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.root().join(relative_path)).unwrap()
  }

  /// A srcbuild command running in CI context from the checkout.
  pub fn srcbuild_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("srcbuild");
    cmd.current_dir(self.checkout());
    cmd.env("SRCBUILD_CONTEXT", "ci");
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
