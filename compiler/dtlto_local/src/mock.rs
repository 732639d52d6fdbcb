//! Test mode: stand-in objects instead of real code generation.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use dtlto_abi::{NodeView, PluginConfig, CODEGEN_FAILED, CODEGEN_OK};
use tracing::debug;

use crate::error::LocalError;

/// Write each node's module id into its object path.
pub(crate) fn perform_mock_codegen(config: &PluginConfig<'_>, nodes: &[NodeView<'_>]) -> i32 {
    debug!(backend = config.name(), items = nodes.len(), "mock codegen");
    let mut status = CODEGEN_OK;
    for node in nodes {
        let path = Path::new(node.native_object_path);
        if let Err(e) = write_new_file(path, node.module_id.as_bytes()) {
            config.emit_error(&e.to_string());
            status = CODEGEN_FAILED;
        }
    }
    status
}

fn write_new_file(path: &Path, content: &[u8]) -> Result<(), LocalError> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .and_then(|mut file| file.write_all(content))
        .map_err(|source| LocalError::CreateFile {
            path: path.to_path_buf(),
            source,
        })
}
