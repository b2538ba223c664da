use depsync_util::fs::{ensure_dir, find_ancestor_with, is_url, write_atomic};
use tempfile::TempDir;

#[test]
fn test_find_ancestor_with_nested() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("depsync.toml"), "").unwrap();
    let nested = tmp.path().join("a").join("b").join("c");
    std::fs::create_dir_all(&nested).unwrap();
    let result = find_ancestor_with(&nested, "depsync.toml");
    assert_eq!(result, Some(tmp.path().to_path_buf()));
}

#[test]
fn test_find_ancestor_with_not_found() {
    let tmp = TempDir::new().unwrap();
    let result = find_ancestor_with(tmp.path(), "NonExistent.file");
    assert_eq!(result, None);
}

#[test]
fn test_ensure_dir_creates_nested() {
    let tmp = TempDir::new().unwrap();
    let deep = tmp.path().join("x").join("y").join("z");
    assert!(!deep.exists());
    ensure_dir(&deep).unwrap();
    assert!(deep.is_dir());
}

#[test]
fn test_write_atomic_creates_parent_and_replaces() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join(".depsync").join("model.json");
    write_atomic(&target, b"first").unwrap();
    write_atomic(&target, b"second").unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
    assert!(!tmp.path().join(".depsync").join(".model.json.tmp").exists());
}

#[test]
fn test_is_url() {
    assert!(is_url("https://example.com/ivysettings.xml"));
    assert!(is_url("file:///tmp/ivysettings.xml"));
    assert!(!is_url("/tmp/ivysettings.xml"));
    assert!(!is_url("ivysettings.xml"));
}
