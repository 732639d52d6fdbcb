use super::*;
use crate::diagnostics::{buffer_handler, Severity};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const TRIPLE: &str = "x86_64-unknown-linux-gnu";

fn registry() -> (TempDir, UnitRegistry) {
    let dir = tempfile::tempdir().unwrap();
    let registry = UnitRegistry::new("1f", dir.path());
    (dir, registry)
}

fn config_in(dir: &TempDir) -> CodegenConfig {
    CodegenConfig::new("local::test")
        .with_session_tag("1f")
        .with_work_dir(dir.path())
        .with_diagnostics(buffer_handler())
}

#[test]
fn file_units_keep_their_id_and_absolute_path() {
    let (dir, mut reg) = registry();
    let id = dir.path().join("obj/../foo.o").display().to_string();
    let unit = reg.register(InputModule::file(&id, &[0; 12], TRIPLE)).unwrap();

    assert_eq!(unit.id(), id);
    assert_eq!(unit.path(), dir.path().join("foo.o"));
    assert_eq!(unit.size(), 12);
    assert_eq!(unit.target_triple(), TRIPLE);
    assert!(!unit.needs_deletion());
    assert!(reg.get(&id).is_some());
}

#[test]
fn archive_member_is_renamed_and_written() {
    let (dir, mut reg) = registry();
    let unit = reg
        .register(InputModule::archive_member("libfoo.a(a.o)", b"BC", TRIPLE))
        .unwrap();

    assert_eq!(unit.id(), "libfoo.a(a.o).1f.o");
    assert!(unit.needs_deletion());
    assert_eq!(unit.path(), dir.path().join("libfoo.a(a.o).1f.o"));
    assert_eq!(std::fs::read(unit.path()).unwrap(), b"BC");
    assert!(reg.get("a.o").is_none());
}

#[test]
fn same_member_name_in_two_archives_gets_two_ids() {
    let (_dir, mut reg) = registry();
    let first = reg
        .register(InputModule::archive_member("x/lib.a(a.o)", b"1", TRIPLE))
        .unwrap()
        .id()
        .to_string();
    let second = reg
        .register(InputModule::archive_member("y/lib.a(a.o)", b"2", TRIPLE))
        .unwrap()
        .id()
        .to_string();

    assert_eq!(first, "lib.a(a.o).1f.o");
    assert_eq!(second, "lib.a(a.o).1f.1.o");
    assert_eq!(reg.len(), 2);
}

#[test]
fn empty_and_duplicate_ids_are_rejected() {
    let (_dir, mut reg) = registry();
    assert!(matches!(
        reg.register(InputModule::file("", b"", TRIPLE)),
        Err(CodegenError::InvalidInput { .. })
    ));
    reg.register(InputModule::file("/a.o", b"", TRIPLE)).unwrap();
    assert!(matches!(
        reg.register(InputModule::file("/a.o", b"", TRIPLE)),
        Err(CodegenError::InvalidInput { .. })
    ));
}

#[test]
fn dispatch_order_is_stable_largest_first() {
    let (_dir, mut reg) = registry();
    for (id, size) in [("/a", 10), ("/b", 100), ("/c", 50), ("/d", 100), ("/e", 1)] {
        reg.register(InputModule::file(id, &vec![0; size], TRIPLE)).unwrap();
    }
    for (task, id) in ["/a", "/b", "/c", "/d"].into_iter().enumerate() {
        reg.get_mut(id).unwrap().select(task + 1, Vec::new());
    }

    let order: Vec<&str> = reg.dispatch_order().iter().map(|u| u.id()).collect();
    assert_eq!(order, vec!["/b", "/d", "/c", "/a"]);
}

#[test]
fn cleanup_removes_temp_files_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut reg = UnitRegistry::for_config(&config).unwrap();

    let file_id = dir.path().join("f.o").display().to_string();
    reg.register(InputModule::file(&file_id, b"F", TRIPLE)).unwrap();
    let member = reg
        .register(InputModule::archive_member("lib.a(m.o)", b"M", TRIPLE))
        .unwrap()
        .clone();
    std::fs::write(member.native_object_path(), b"obj").unwrap();

    // 2 derived paths per unit plus the member copy.
    assert_eq!(reg.cleanup(&config), 5);
    assert!(!member.path().exists());
    assert!(!member.native_object_path().exists());
    assert!(reg.is_cleaned());
    assert_eq!(reg.cleanup(&config), 0);
    assert!(config.diagnostics().messages(Severity::Warning).is_empty());
}

#[test]
fn cleanup_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir).with_temp_removal_disabled(true);
    let mut reg = UnitRegistry::for_config(&config).unwrap();
    let member = reg
        .register(InputModule::archive_member("lib.a(m.o)", b"M", TRIPLE))
        .unwrap()
        .clone();

    assert_eq!(reg.cleanup(&config), 0);
    assert!(member.path().exists());
}

#[cfg(unix)]
#[test]
fn cleanup_failures_become_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut reg = UnitRegistry::for_config(&config).unwrap();
    let id = dir.path().join("f.o").display().to_string();
    let unit = reg.register(InputModule::file(&id, b"F", TRIPLE)).unwrap().clone();

    // A directory where a file is expected cannot be removed with remove_file.
    std::fs::create_dir(unit.native_object_path()).unwrap();

    assert_eq!(reg.cleanup(&config), 2);
    let warnings = config.diagnostics().messages(Severity::Warning);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Can't remove file"));
}
