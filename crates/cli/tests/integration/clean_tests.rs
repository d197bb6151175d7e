use predicates::prelude::*;

use super::common::TestEnv;

const CLEAN_PROJECT: &str = r#"
[project]
clean_paths = ["build", "test_env"]
distclean_paths = ["downloads"]
"#;

fn populated_env() -> TestEnv {
  let env = TestEnv::with_project(CLEAN_PROJECT);
  env.write_file("build/mod.nrm", "nrm");
  env.write_file("downloads/sdk.zip", "zip");
  env.write_file("src/main.c", "int main;");
  env
}

#[test]
fn clean_removes_build_folders_only() {
  let env = populated_env();

  env
    .modbuild_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Deleted").and(predicate::str::contains("Nothing to delete")));

  assert!(!env.path("build").exists());
  assert!(env.path("downloads/sdk.zip").exists());
  assert!(env.path("src/main.c").exists());
}

#[test]
fn distclean_also_removes_downloads() {
  let env = populated_env();

  env.modbuild_cmd().arg("distclean").assert().success();

  assert!(!env.path("build").exists());
  assert!(!env.path("downloads").exists());
  assert!(env.path("src/main.c").exists());
  assert!(env.path("modbuild.toml").exists());
}

#[test]
fn clean_twice_is_fine() {
  let env = populated_env();

  env.modbuild_cmd().arg("clean").assert().success();
  env.modbuild_cmd().arg("clean").assert().success();
  assert!(env.root().is_dir());
}

#[test]
fn distclean_json_reports_each_path() {
  let env = populated_env();

  let output = env
    .modbuild_cmd()
    .args(["distclean", "--output", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["clean"]["entries"].as_array().unwrap().len(), 2);
  assert_eq!(json["clean"]["entries"][0][1], "deleted");
  assert_eq!(json["clean"]["entries"][1][1], "missing");
  assert_eq!(json["distclean"]["entries"][0][1], "deleted");
}
