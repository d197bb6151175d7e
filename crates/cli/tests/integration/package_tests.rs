//! Thunderstore packages and their manifests.

use predicates::prelude::*;

use super::common::{TestEnv, zip_names};

const PACKAGE_PROJECT: &str = r#"
[[thunderstore_packages]]
name = "main"
file = "dist/my_mod.zip"
readme = "README.md"
changelog = "CHANGELOG.md"
icon = "icon.png"
outputs = { "mods/my_mod.nrm" = "build/my_mod.nrm" }

[thunderstore_packages.manifest]
name = "my_mod"
version_number = "1.2.0"
website_url = "https://example.com/my_mod"
description = "A mod"
dependencies = ["Someone-Lib-1.0.0"]
"#;

fn package_env() -> TestEnv {
  let env = TestEnv::with_project(PACKAGE_PROJECT);
  env.write_file("README.md", "# My mod");
  env.write_file("CHANGELOG.md", "## 1.2.0");
  env.write_file("icon.png", "png");
  env.write_file("build/my_mod.nrm", "nrm");
  env
}

#[test]
fn thunderstore_package_holds_metadata_and_outputs() {
  let env = package_env();

  env.modbuild_cmd().arg("thunderstore").assert().success();

  assert_eq!(
    zip_names(&env.path("dist/my_mod.zip")),
    vec![
      "CHANGELOG.md",
      "README.md",
      "icon.png",
      "manifest.json",
      "mods/my_mod.nrm",
    ]
  );
}

#[test]
fn manifest_writes_to_the_package_name_by_default() {
  let env = package_env();

  env
    .modbuild_cmd()
    .arg("manifest")
    .assert()
    .success()
    .stdout(predicate::str::contains("my_mod.json"));

  let json: serde_json::Value = serde_json::from_str(&env.read("my_mod.json")).unwrap();
  assert_eq!(json["name"], "my_mod");
  assert_eq!(json["version_number"], "1.2.0");
  assert_eq!(json["dependencies"][0], "Someone-Lib-1.0.0");
  assert!(!env.path("dist").exists());
}

#[test]
fn manifest_output_file_uses_four_space_indent() {
  let env = package_env();

  env
    .modbuild_cmd()
    .args(["manifest", "--name", "main", "--output-file", "meta/manifest.json"])
    .assert()
    .success();

  let content = env.read("meta/manifest.json");
  assert!(content.contains("\n    \"name\": \"my_mod\""));
}

#[test]
fn manifest_list_prints_package_names() {
  let env = package_env();

  env
    .modbuild_cmd()
    .args(["manifest", "--list"])
    .assert()
    .success()
    .stdout(predicate::str::contains("main"));
}
