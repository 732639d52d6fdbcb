use super::*;
use pretty_assertions::assert_eq;

fn desc<'a>(id: &'a str, imports: &'a [String]) -> NodeDesc<'a> {
    NodeDesc {
        module_id: id,
        module_path: "/work/a.o",
        module_size: 42,
        summary_index_path: "/work/a.o.1f.thinlto.bc",
        native_object_path: "/work/a.o.1f.native.o",
        imports,
        target_triple: "x86_64-unknown-linux-gnu",
        task_number: 3,
    }
}

#[test]
fn cstr_array_keeps_order() {
    let array = CStrArray::new("argv", ["-O2", "-fpic"]).unwrap();
    assert_eq!(array.len(), 2);
    assert!(!array.is_empty());
}

#[test]
fn cstr_array_rejects_interior_nul() {
    let err = CStrArray::new("argv", ["ok", "bad\0arg"]).unwrap_err();
    assert_eq!(err.field, "argv");
    assert_eq!(err.value, "bad\0arg");
}

#[test]
fn views_mirror_pushed_nodes() {
    let imports = vec!["b.o".to_string(), "c.o".to_string()];
    let mut table = NodeTable::new();
    table.push(desc("a.o", &imports)).unwrap();
    table.push(desc("d.o", &[])).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.node_ptrs().len(), 2);

    let views = table.views().unwrap();
    assert_eq!(views[0].module_id, "a.o");
    assert_eq!(views[0].imports, vec!["b.o", "c.o"]);
    assert_eq!(views[0].module_size, 42);
    assert_eq!(views[0].task_number, 3);
    assert_eq!(views[0].native_object_path, "/work/a.o.1f.native.o");
    assert_eq!(views[1].module_id, "d.o");
    assert!(views[1].imports.is_empty());
}

#[test]
fn push_reports_offending_field() {
    let mut table = NodeTable::new();
    let mut bad = desc("a.o", &[]);
    bad.target_triple = "x86\0_64";
    let err = table.push(bad).unwrap_err();
    assert_eq!(err.field, "target_triple");
    assert!(table.is_empty());
}
