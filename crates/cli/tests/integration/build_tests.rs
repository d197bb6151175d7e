use predicates::prelude::*;

use super::common::TestEnv;

/// An archive extracted from disk, whose contents a build output collects.
const EXTRACT_AND_COLLECT: &str = r#"
[[extractions]]
name = "tools"
archive = "archives/tools.zip"
dest = "binaries/tools"
outputs = { "tool.bin" = "binaries/tools/tools-1.0/tool.bin" }

[[build_outputs]]
name = "debug"
path = "test_env/mods"
depends_on = ["extract:tools"]
outputs = { "notes/readme.txt" = "docs/readme.txt" }
"#;

fn extract_env() -> TestEnv {
  let env = TestEnv::with_project(EXTRACT_AND_COLLECT);
  env.write_zip("archives/tools.zip", &[("tools-1.0/tool.bin", "tool v1")]);
  env.write_file("docs/readme.txt", "read me");
  env
}

#[test]
fn default_command_builds_outputs_with_dependencies() {
  let env = extract_env();

  env
    .modbuild_cmd()
    .assert()
    .success()
    .stdout(
      predicate::str::contains("==> Preparing build output folders").and(predicate::str::contains("1 job resolved in")),
    );

  assert_eq!(env.read("binaries/tools/tools-1.0/tool.bin"), "tool v1");
  assert_eq!(env.read("test_env/mods/tool.bin"), "tool v1");
  assert_eq!(env.read("test_env/mods/notes/readme.txt"), "read me");
}

#[test]
fn skipping_dependencies_leaves_their_outputs_out() {
  let env = extract_env();

  env
    .modbuild_cmd()
    .args(["build", "--skip-dependencies"])
    .assert()
    .success();

  assert!(!env.path("binaries/tools").exists());
  assert!(!env.path("test_env/mods/tool.bin").exists());
  assert_eq!(env.read("test_env/mods/notes/readme.txt"), "read me");
}

#[test]
fn dependency_already_done_is_still_collected() {
  let env = extract_env();
  env.modbuild_cmd().arg("extract").assert().success();

  // The extraction is not needed any more, but it counts as resolved.
  env.modbuild_cmd().arg("build").assert().success();
  assert_eq!(env.read("test_env/mods/tool.bin"), "tool v1");
}

#[test]
fn unresolved_jobs_flag_collects_skipped_dependencies() {
  let env = extract_env();
  env.write_file("binaries/tools/tools-1.0/tool.bin", "prebuilt");

  env
    .modbuild_cmd()
    .args(["build", "--skip-dependencies", "--unresolved-jobs"])
    .assert()
    .success();

  assert_eq!(env.read("test_env/mods/tool.bin"), "prebuilt");
}

#[test]
fn forced_extraction_of_missing_archive_names_the_job() {
  let env = extract_env();
  std::fs::remove_file(env.path("archives/tools.zip")).unwrap();
  std::fs::create_dir_all(env.path("binaries/tools")).unwrap();

  // Without --force the existing destination means nothing to do.
  env.modbuild_cmd().arg("extract").assert().success();

  env
    .modbuild_cmd()
    .args(["extract", "--force"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("job 'extract:tools' failed"));
}

#[test]
fn all_resolved_jobs_collects_outputs_of_unrelated_jobs() {
  let env = TestEnv::with_project(
    r#"
[[extractions]]
name = "tools"
archive = "tools.zip"
dest = "binaries/tools"
outputs = { "tool.bin" = "binaries/tools/tool.bin" }

[[build_outputs]]
name = "with_tools"
path = "out_a"
depends_on = ["extract:tools"]

[[build_outputs]]
name = "plain"
path = "out_b"
"#,
  );
  env.write_zip("tools.zip", &[("tool.bin", "tool")]);

  env
    .modbuild_cmd()
    .args(["build", "--name", "with_tools,plain"])
    .assert()
    .success();
  assert_eq!(env.read("out_a/tool.bin"), "tool");
  assert!(!env.path("out_b/tool.bin").exists());

  std::fs::remove_dir_all(env.path("out_b")).unwrap();
  env
    .modbuild_cmd()
    .args(["build", "--name", "with_tools,plain", "--all-resolved-jobs"])
    .assert()
    .success();
  assert_eq!(env.read("out_b/tool.bin"), "tool");
}

#[test]
fn build_outputs_can_be_selected_by_name() {
  let env = TestEnv::with_project(
    r#"
[[build_outputs]]
name = "a"
path = "out_a"
outputs = { "x.txt" = "x.txt" }

[[build_outputs]]
name = "b"
path = "out_b"
outputs = { "x.txt" = "x.txt" }
"#,
  );
  env.write_file("x.txt", "x");

  env
    .modbuild_cmd()
    .args(["build", "--name", "b"])
    .assert()
    .success();

  assert!(!env.path("out_a").exists());
  assert_eq!(env.read("out_b/x.txt"), "x");
}

#[test]
fn verbose_flag_enables_job_logs() {
  let env = extract_env();

  env
    .modbuild_cmd()
    .arg("--verbose")
    .assert()
    .success()
    .stderr(predicate::str::contains("running job"));
}
