use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn depsync_cmd() -> Command {
    Command::cargo_bin("depsync").unwrap()
}

const IVY: &str = r#"<ivy-module version="2.0">
    <info organisation="org.example" module="app" revision="1.0"/>
    <configurations>
        <conf name="compile"/>
        <conf name="test" extends="compile"/>
    </configurations>
</ivy-module>"#;

const REPORT: &str = r#"{
  "configurations": [
    {
      "configuration": "compile",
      "dependencies": [
        {
          "id": { "organisation": "com.lib", "name": "lib", "revision": "2.0" },
          "downloads": [
            {
              "artifact": {
                "module": { "organisation": "com.lib", "name": "lib", "revision": "2.0" },
                "name": "lib",
                "type": "jar",
                "ext": "jar"
              },
              "local_file": "com.lib/lib/jars/lib-2.0.jar"
            }
          ]
        }
      ]
    }
  ]
}"#;

/// A one-module project with its report and cache in place.
fn project(tmp: &TempDir) -> &Path {
    let root = tmp.path();
    fs::write(
        root.join("depsync.toml"),
        r#"
[settings]
cache-dir = "../cache"

[[module]]
name = "app"
dir = "app"
"#,
    )
    .unwrap();
    fs::create_dir_all(root.join("app")).unwrap();
    fs::write(root.join("app/ivy.xml"), IVY).unwrap();
    fs::write(root.join("app/ivy.xml.report.json"), REPORT).unwrap();
    let jar_dir = root.join("cache/com.lib/lib/jars");
    fs::create_dir_all(&jar_dir).unwrap();
    fs::write(jar_dir.join("lib-2.0.jar"), "PK").unwrap();
    root
}

#[test]
fn test_sync_without_project_file_fails() {
    let tmp = TempDir::new().unwrap();

    depsync_cmd()
        .current_dir(tmp.path())
        .args(["sync"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not find depsync.toml"));
}

#[test]
fn test_sync_writes_model() {
    let tmp = TempDir::new().unwrap();
    let root = project(&tmp);

    depsync_cmd()
        .current_dir(root)
        .args(["sync"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Synced"));

    let model = fs::read_to_string(root.join(".depsync/model.json")).unwrap();
    assert!(model.contains("depsync: com.lib:lib:2.0"));
}

#[test]
fn test_sync_from_module_directory() {
    let tmp = TempDir::new().unwrap();
    let root = project(&tmp);

    depsync_cmd()
        .current_dir(root.join("app"))
        .args(["sync", "app"])
        .assert()
        .success();

    assert!(root.join(".depsync/model.json").is_file());
}

#[test]
fn test_sync_twice_is_fresh() {
    let tmp = TempDir::new().unwrap();
    let root = project(&tmp);

    depsync_cmd().current_dir(root).args(["sync"]).assert().success();
    depsync_cmd()
        .current_dir(root)
        .args(["sync"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Fresh"))
        .stderr(predicate::str::contains("0 changes"));
}

#[test]
fn test_sync_unknown_module_fails() {
    let tmp = TempDir::new().unwrap();
    let root = project(&tmp);

    depsync_cmd()
        .current_dir(root)
        .args(["sync", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_sync_missing_report_fails() {
    let tmp = TempDir::new().unwrap();
    let root = project(&tmp);
    fs::remove_file(root.join("app/ivy.xml.report.json")).unwrap();

    depsync_cmd()
        .current_dir(root)
        .args(["sync"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to sync 1 of 1 modules: app"));

    assert!(!root.join(".depsync/model.json").exists());
}

#[test]
fn test_sync_reports_missing_file_as_problem() {
    let tmp = TempDir::new().unwrap();
    let root = project(&tmp);
    fs::remove_dir_all(root.join("cache")).unwrap();

    depsync_cmd()
        .current_dir(root)
        .args(["sync"])
        .assert()
        .success()
        .stderr(predicate::str::contains("File not found"))
        .stderr(predicate::str::contains("1 problems"));
}
