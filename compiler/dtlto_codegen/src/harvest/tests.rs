use super::*;
use crate::outputs::TaskOutputs;
use crate::registry::InputModule;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn registry_with(ids: &[&str]) -> (TempDir, UnitRegistry) {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = UnitRegistry::new("1f", dir.path());
    for (i, id) in ids.iter().enumerate() {
        let id = dir.path().join(id).display().to_string();
        registry
            .register(InputModule::file(&id, b"bc", "x86_64-unknown-linux-gnu"))
            .unwrap();
        // Reverse task order relative to registration.
        registry.get_mut(&id).unwrap().select(ids.len() - i, Vec::new());
    }
    (dir, registry)
}

fn write_object(registry: &UnitRegistry, id: &str, bytes: &[u8]) {
    let unit = registry.iter().find(|u| u.id().ends_with(id)).unwrap();
    std::fs::write(unit.native_object_path(), bytes).unwrap();
}

#[test]
fn objects_are_read_back_by_task() {
    let (_dir, mut registry) = registry_with(&["a.o", "b.o"]);
    write_object(&registry, "a.o", b"AAA");
    write_object(&registry, "b.o", b"\x7fELF");
    let mut outputs = TaskOutputs::new();

    assert_eq!(harvest(&mut registry, &mut outputs).unwrap(), 2);

    assert_eq!(outputs.get(2).unwrap().buffer, b"AAA");
    assert!(outputs.get(2).unwrap().module.ends_with("a.o"));
    assert_eq!(outputs.get(1).unwrap().buffer, b"\x7fELF");
    assert!(registry.iter().all(|u| u.state() == UnitState::Consumed));
}

#[test]
fn missing_objects_do_not_stop_the_batch() {
    let (_dir, mut registry) = registry_with(&["a.o", "b.o", "c.o"]);
    write_object(&registry, "b.o", b"B");
    let mut outputs = TaskOutputs::new();

    let err = harvest(&mut registry, &mut outputs).unwrap_err();

    let missing: Vec<&str> = err
        .leaves()
        .into_iter()
        .map(|e| match e {
            CodegenError::MissingOutput { module, .. } => module.as_str(),
            other => panic!("unexpected {other}"),
        })
        .collect();
    assert_eq!(missing.len(), 2);
    // Task order: c.o is task 1, a.o is task 3.
    assert!(missing[0].ends_with("c.o"));
    assert!(missing[1].ends_with("a.o"));
    assert_eq!(outputs.get(2).unwrap().buffer, b"B");
    assert_eq!(outputs.populated().count(), 1);
}

#[test]
fn second_harvest_is_a_no_op() {
    let (_dir, mut registry) = registry_with(&["a.o"]);
    write_object(&registry, "a.o", b"A");
    let mut outputs = TaskOutputs::new();

    assert_eq!(harvest(&mut registry, &mut outputs).unwrap(), 1);
    assert_eq!(harvest(&mut registry, &mut outputs).unwrap(), 0);
    assert_eq!(outputs.populated().count(), 1);
}

#[test]
fn pending_units_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = UnitRegistry::new("1f", dir.path());
    let id = dir.path().join("skip.o").display().to_string();
    registry
        .register(InputModule::file(&id, b"bc", "x86_64-unknown-linux-gnu"))
        .unwrap();

    assert_eq!(harvest(&mut registry, &mut TaskOutputs::new()).unwrap(), 0);
}
