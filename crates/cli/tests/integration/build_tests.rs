//! Full runs against stand-in autotools scripts.

use predicates::prelude::*;
use serial_test::serial;

use super::common::TestEnv;

#[test]
#[serial]
fn ci_run_builds_primary_in_place() {
  let env = TestEnv::new();
  env.write_file("prefix/lib/libfoo.so.0", "stale");
  let build_file = env.write_build_file("");

  env
    .srcbuild_cmd()
    .arg("--file")
    .arg(&build_file)
    .args(["--", "--enable-extra"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Built 1 target(s)"));

  assert!(env.checkout().join("autogen.ran").exists());
  assert_eq!(
    env.read("checkout/configure.args"),
    format!("--prefix={} --x=1 --x=2 --enable-extra\n", env.prefix().display())
  );
  assert_eq!(env.read("checkout/make.log"), "-j2\ninstall\n");

  assert!(!env.prefix().join("lib/libfoo.so.0").exists(), "stale install is cleaned first");
  assert!(env.prefix().join("lib/libfoo.so.1").exists());
  assert!(env.root().join("smoke.ran").exists());
  assert!(!env.workspace().exists(), "workspace is removed after success");
}

#[test]
#[serial]
fn failing_configure_propagates_exit_code() {
  let env = TestEnv::new();
  env.write_script("checkout/configure", "#!/bin/sh\nexit 7\n");
  let build_file = env.write_build_file("");

  env
    .srcbuild_cmd()
    .arg("--file")
    .arg(&build_file)
    .assert()
    .code(7)
    .stderr(predicate::str::contains("configure failed for libfoo"));

  assert!(!env.checkout().join("make.log").exists(), "nothing runs after the failure");
  assert!(!env.root().join("smoke.ran").exists());
  assert!(env.workspace().exists(), "workspace is kept for inspection");
}

#[test]
#[serial]
fn failing_smoke_test_propagates_exit_code() {
  let env = TestEnv::new();
  env.write_script("bin/smoke", "#!/bin/sh\nexit 3\n");
  let build_file = env.write_build_file("");

  env
    .srcbuild_cmd()
    .arg("--file")
    .arg(&build_file)
    .assert()
    .code(3)
    .stderr(predicate::str::contains("smoke test failed for libfoo"));

  assert!(env.prefix().join("lib/libfoo.so.1").exists());
}

#[test]
#[serial]
fn never_policy_keeps_workspace() {
  let env = TestEnv::new();
  let build_file = env.write_build_file("cleanup = \"never\"");

  env
    .srcbuild_cmd()
    .arg("--file")
    .arg(&build_file)
    .assert()
    .success()
    .stdout(predicate::str::contains("Workspace kept at"));

  assert!(env.workspace().join(".git").exists());
}

#[test]
#[serial]
fn always_policy_removes_workspace_after_failure() {
  let env = TestEnv::new();
  env.write_script("checkout/configure", "#!/bin/sh\nexit 4\n");
  let build_file = env.write_build_file("");

  env
    .srcbuild_cmd()
    .arg("--file")
    .arg(&build_file)
    .args(["--cleanup", "always"])
    .assert()
    .code(4);

  assert!(!env.workspace().exists());
}

#[test]
#[serial]
fn workspace_over_the_checkout_is_refused() {
  let env = TestEnv::new();
  let build_file = env.write_build_file("");

  env
    .srcbuild_cmd()
    .arg("--file")
    .arg(&build_file)
    .args(["--workspace", ".", "--cleanup", "always"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("would remove"));

  assert!(env.checkout().join("configure").exists(), "checkout must survive");
  assert!(!env.checkout().join("configure.args").exists(), "nothing is built");
}
