use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn depsync_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("depsync").unwrap();
    cmd.env("HOME", home.path());
    cmd
}

const TEMPLATE: &str = r#"<ivy-module version="2.0">
    <info organisation="org.example" module="${MODULE_NAME}"/>
</ivy-module>
"#;

fn project(settings: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("depsync.toml"),
        format!(
            r#"{settings}

[[module]]
name = "web"
dir = "web"
"#
        ),
    )
    .unwrap();
    tmp
}

#[test]
fn init_writes_manifest_from_project_template() {
    let home = TempDir::new().unwrap();
    let tmp = project("[settings]\nivy-template = \"templates/ivy.xml\"");
    fs::create_dir_all(tmp.path().join("templates")).unwrap();
    fs::write(tmp.path().join("templates/ivy.xml"), TEMPLATE).unwrap();

    depsync_cmd(&home)
        .args(["init", "web"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Created"));

    let manifest = fs::read_to_string(tmp.path().join("web/ivy.xml")).unwrap();
    assert!(manifest.contains(r#"module="web""#));
    assert!(!manifest.contains("MODULE_NAME"));

    depsync_cmd(&home)
        .args(["init", "web"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_falls_back_to_global_template() {
    let home = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join(".depsync")).unwrap();
    fs::write(
        home.path().join(".depsync/config.toml"),
        "[settings]\nivy-template = \"ivy.template\"\n",
    )
    .unwrap();
    fs::write(home.path().join(".depsync/ivy.template"), TEMPLATE).unwrap();
    let tmp = project("");

    depsync_cmd(&home)
        .args(["init", "web"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let manifest = fs::read_to_string(tmp.path().join("web/ivy.xml")).unwrap();
    assert!(manifest.contains(r#"module="web""#));
}

#[test]
fn init_without_template_skips() {
    let home = TempDir::new().unwrap();
    let tmp = project("");

    depsync_cmd(&home)
        .args(["init", "web"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("no ivy-template"));

    assert!(!tmp.path().join("web/ivy.xml").exists());
}

#[test]
fn init_unknown_module_fails() {
    let home = TempDir::new().unwrap();
    let tmp = project("");

    depsync_cmd(&home)
        .args(["init", "nope"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}
