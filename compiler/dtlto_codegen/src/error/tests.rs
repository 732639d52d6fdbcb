use super::*;
use pretty_assertions::assert_eq;

fn missing(module: &str) -> CodegenError {
    CodegenError::MissingOutput {
        module: module.to_string(),
        path: PathBuf::from(format!("{module}.native.o")),
    }
}

#[test]
fn combine_of_nothing_is_none() {
    assert!(CodegenError::combine(Vec::new()).is_none());
}

#[test]
fn combine_of_one_is_that_error() {
    let e = CodegenError::combine([missing("a.o")]);
    assert!(matches!(e, Some(CodegenError::MissingOutput { .. })));
}

#[test]
fn join_flattens_nested_lists() {
    let failed = CodegenError::BackendCodegenFailed {
        backend: "local".to_string(),
        code: 1,
    };
    let harvest = CodegenError::combine([missing("a.o"), missing("b.o")]);
    let Some(harvest) = harvest else {
        panic!("two errors must combine");
    };
    let joined = failed.join(harvest);

    let leaves = joined.leaves();
    assert_eq!(leaves.len(), 3);
    assert!(matches!(leaves[0], CodegenError::BackendCodegenFailed { code: 1, .. }));
    assert!(matches!(leaves[2], CodegenError::MissingOutput { module, .. } if module == "b.o"));
}

#[test]
fn list_displays_one_error_per_line() {
    let joined = missing("a.o").join(missing("b.o"));
    assert_eq!(
        joined.to_string(),
        "no native object for module 'a.o': a.o.native.o does not exist\n\
         no native object for module 'b.o': b.o.native.o does not exist"
    );
}

#[test]
fn io_error_names_action_and_path() {
    let e = CodegenError::io(
        "remove",
        "/tmp/x.bc",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    assert_eq!(e.to_string(), "Can't remove file /tmp/x.bc: denied");
}
