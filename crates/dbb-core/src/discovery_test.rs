use super::*;
use std::fs;
use tempfile::tempdir;

fn make_dirs(root: &Path, names: &[&str]) {
    for name in names {
        fs::create_dir_all(root.join(name)).unwrap();
    }
}

#[test]
fn test_discovers_and_sorts_numerically() {
    let dir = tempdir().unwrap();
    make_dirs(dir.path(), &["10-Later", "2-Second", "1-Initial", "2_5-Patch"]);

    let scripts = discover_scripts(dir.path()).unwrap();
    let names: Vec<&str> = scripts.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["-Initial", "-Second", "-Patch", "-Later"]);
    assert!(scripts.iter().all(|s| s.content().is_some()));
}

#[test]
fn test_empty_root_yields_no_scripts() {
    let dir = tempdir().unwrap();
    assert!(discover_scripts(dir.path()).unwrap().is_empty());
}

#[test]
fn test_single_malformed_entry_is_fatal() {
    let dir = tempdir().unwrap();
    make_dirs(dir.path(), &["1-Initial", "notes", "2-Second"]);

    let err = discover_scripts(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::OrderParse { ref name, .. } if name == "notes"));
}

#[test]
fn test_duplicate_order_is_rejected() {
    let dir = tempdir().unwrap();
    make_dirs(dir.path(), &["3-Alpha", "3-Beta"]);

    let err = discover_scripts(dir.path()).unwrap_err();
    match err {
        CoreError::DuplicateOrder {
            order,
            first,
            second,
            ..
        } => {
            assert_eq!(order, "3");
            assert_eq!(first, "-Alpha");
            assert_eq!(second, "-Beta");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_numerically_equal_orders_are_duplicates() {
    let dir = tempdir().unwrap();
    make_dirs(dir.path(), &["4_5-One", "4_50-Two"]);

    assert!(matches!(
        discover_scripts(dir.path()),
        Err(CoreError::DuplicateOrder { .. })
    ));
}

#[test]
fn test_missing_root() {
    let dir = tempdir().unwrap();
    let err = discover_scripts(&dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, CoreError::ScriptRootNotFound { .. }));
}
