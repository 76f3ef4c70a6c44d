use rig_util::fs::{find_file_upwards, write_atomic};
use tempfile::TempDir;

#[test]
fn test_find_file_upwards_direct() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("build.rig"), "").unwrap();
    let result = find_file_upwards(tmp.path(), "build.rig");
    assert_eq!(result, Some(tmp.path().join("build.rig")));
}

#[test]
fn test_find_file_upwards_nested() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("build.rig"), "").unwrap();
    let nested = tmp.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();
    let result = find_file_upwards(&nested, "build.rig");
    assert_eq!(result, Some(tmp.path().join("build.rig")));
}

#[test]
fn test_find_file_upwards_not_found() {
    let tmp = TempDir::new().unwrap();
    assert_eq!(find_file_upwards(tmp.path(), "NonExistent.file"), None);
}

#[test]
fn test_write_atomic_creates_parents_and_overwrites() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("out").join("plan.json");
    write_atomic(&target, "first").unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "first");
    write_atomic(&target, "second").unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
}
