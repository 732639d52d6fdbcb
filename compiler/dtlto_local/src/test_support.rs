//! Shared fixtures for the backend tests.

use std::path::Path;

use dtlto_abi::{DiagnosticSink, NodeDesc, NodeTable};
use parking_lot::Mutex;

/// Sink that keeps every diagnostic.
#[derive(Default)]
pub(crate) struct Collect(pub(crate) Mutex<Vec<String>>);

impl DiagnosticSink for Collect {
    fn emit_error(&self, message: &str) {
        self.0.lock().push(format!("error: {message}"));
    }

    fn emit_warn(&self, message: &str) {
        self.0.lock().push(format!("warning: {message}"));
    }
}

impl Collect {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// One node per id, with all derived files placed in `dir`.
pub(crate) fn table_in(dir: &Path, ids: &[&str]) -> NodeTable {
    let mut table = NodeTable::new();
    for (task, id) in ids.iter().enumerate() {
        let base = dir.join(id);
        let module_path = base.display().to_string();
        let index = format!("{module_path}.1f.thinlto.bc");
        let object = format!("{module_path}.1f.native.o");
        let pushed = table.push(NodeDesc {
            module_id: id,
            module_path: &module_path,
            module_size: 10 * (task + 1),
            summary_index_path: &index,
            native_object_path: &object,
            imports: &[],
            target_triple: "x86_64-unknown-linux-gnu",
            task_number: task + 1,
        });
        assert!(pushed.is_ok());
    }
    table
}
