//! External command handling: echo, dry runs and lenient mode.

use predicates::prelude::*;

use super::common::TestEnv;

const MAKEFILE_PROJECT: &str = r#"
[[makefiles]]
name = "mod"
makefile = "mod.mk"
"#;

#[test]
fn dry_echo_prints_without_running() {
  let env = TestEnv::with_project(MAKEFILE_PROJECT);

  // No mod.mk exists, so a real run would fail.
  env
    .modbuild_cmd()
    .args(["--dry", "--echo", "makefile"])
    .assert()
    .success()
    .stdout(predicate::str::contains("make -f").and(predicate::str::contains("mod.mk")));
}

#[test]
fn dry_run_without_echo_is_quiet() {
  let env = TestEnv::with_project(MAKEFILE_PROJECT);

  env
    .modbuild_cmd()
    .args(["--dry", "makefile"])
    .assert()
    .success()
    .stdout(predicate::str::contains("make -f").not());
}

#[cfg(unix)]
mod unix {
  use predicates::prelude::*;

  use super::TestEnv;

  const FAILING_MAKE: &str = r#"
[[makefiles]]
name = "broken"
makefile = "mod.mk"
make = "false"

[[build_outputs]]
name = "debug"
path = "out"
depends_on = ["makefile:broken"]
"#;

  #[test]
  fn failing_command_stops_the_chain() {
    let env = TestEnv::with_project(FAILING_MAKE);

    env
      .modbuild_cmd()
      .arg("build")
      .assert()
      .failure()
      .stderr(predicate::str::contains("job 'makefile:broken' failed"));

    assert!(!env.path("out").exists());
  }

  #[test]
  fn warn_only_keeps_going() {
    let env = TestEnv::with_project(FAILING_MAKE);

    env
      .modbuild_cmd()
      .args(["--warn-only", "build"])
      .assert()
      .success();

    assert!(env.path("out").is_dir());
  }
}
