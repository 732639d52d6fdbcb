//! Flat `#[repr(C)]` structures shared with backend libraries.
//!
//! Field order and types are part of the binary interface. Append new
//! fields only together with a [`DTLTO_ABI_VERSION`] bump.

use std::ffi::{c_char, c_int};

/// Version stored in [`DtltoConfig::abi_version`].
pub const DTLTO_ABI_VERSION: u32 = 1;

/// Name of the entry point every backend library must export.
pub const PERFORM_CODEGEN_SYMBOL: &str = "dtltoPerformCodegen";

/// Backend finished and every requested object was produced.
pub const CODEGEN_OK: c_int = 0;
/// At least one item failed; details went through `emit_error`.
pub const CODEGEN_FAILED: c_int = 1;
/// The request itself was malformed (version mismatch, null or non-UTF-8 strings).
pub const CODEGEN_BAD_REQUEST: c_int = 3;
/// The backend panicked; the panic was contained at the boundary.
pub const CODEGEN_PANICKED: c_int = 4;

/// Opaque diagnostic context owned by the host.
#[derive(Debug)]
#[repr(C)]
pub struct DtltoDiagContext {
    _private: [u8; 0],
}

/// Diagnostic callback: context plus a NUL-terminated message.
pub type EmitDiagFn = unsafe extern "C" fn(*const DtltoDiagContext, *const c_char);

/// Per-call configuration block.
#[derive(Debug)]
#[repr(C)]
pub struct DtltoConfig {
    pub abi_version: u32,
    /// Backend identifier as configured by the user (e.g. `local::test`).
    pub dbs_name: *const c_char,
    pub diag_context: *const DtltoDiagContext,
    pub emit_error: EmitDiagFn,
    pub emit_warn: EmitDiagFn,
}

/// One codegen work item.
#[derive(Debug)]
#[repr(C)]
pub struct DtltoBitcodeNode {
    pub module_id: *const c_char,
    pub module_path: *const c_char,
    pub module_size: usize,
    pub summary_index_path: *const c_char,
    pub native_object_path: *const c_char,
    pub imports_list_size: usize,
    pub imports_list: *const *const c_char,
    pub target_triple: *const c_char,
    pub task_number: usize,
}

/// Signature of [`PERFORM_CODEGEN_SYMBOL`].
pub type PerformCodegenFn = unsafe extern "C" fn(
    cfg: *const DtltoConfig,
    nodes_num: usize,
    nodes: *const *const DtltoBitcodeNode,
    argc: usize,
    argv: *const *const c_char,
) -> c_int;
