//! Serving the C entry point from a [`CodegenBackend`].

use std::ffi::{c_char, c_int};
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::backend::CodegenBackend;
use crate::raw::{DtltoBitcodeNode, DtltoConfig, CODEGEN_BAD_REQUEST, CODEGEN_PANICKED};
use crate::view::{args_from_raw, nodes_from_raw, PluginConfig};

/// Validate the raw request, run `backend`, and contain any panic.
///
/// # Safety
///
/// The arguments must satisfy the `dtltoPerformCodegen` contract: `cfg`
/// points to a valid config, `nodes` to `nodes_num` valid node pointers and
/// `argv` to `argc` NUL-terminated strings, all alive for the call.
pub unsafe fn perform_codegen<B: CodegenBackend>(
    backend: &B,
    cfg: *const DtltoConfig,
    nodes_num: usize,
    nodes: *const *const DtltoBitcodeNode,
    argc: usize,
    argv: *const *const c_char,
) -> c_int {
    // SAFETY: forwarded from the caller's contract.
    let Ok(config) = (unsafe { PluginConfig::from_raw(cfg) }) else {
        return CODEGEN_BAD_REQUEST;
    };
    if let Err(e) = config.check_version() {
        config.emit_error(&e.to_string());
        return CODEGEN_BAD_REQUEST;
    }

    // SAFETY: forwarded from the caller's contract.
    let request = unsafe { nodes_from_raw(nodes, nodes_num) }.and_then(|nodes| {
        // SAFETY: forwarded from the caller's contract.
        let args = unsafe { args_from_raw(argv, argc) }?;
        Ok((nodes, args))
    });
    let (nodes, args) = match request {
        Ok(request) => request,
        Err(e) => {
            config.emit_error(&format!("malformed codegen request: {e}"));
            return CODEGEN_BAD_REQUEST;
        }
    };

    match catch_unwind(AssertUnwindSafe(|| {
        backend.perform_codegen(&config, &nodes, &args)
    })) {
        Ok(code) => code,
        Err(_) => {
            config.emit_error(&format!("backend '{}' panicked", config.name()));
            CODEGEN_PANICKED
        }
    }
}
