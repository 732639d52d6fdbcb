//! Borrowed, validated views over the raw structures.
//!
//! Conversion happens once at the boundary; everything past it works with
//! `&str` and slices.

use std::ffi::{c_char, CStr, CString};

use crate::raw::{DtltoBitcodeNode, DtltoConfig, EmitDiagFn, DTLTO_ABI_VERSION};

/// A malformed request crossing the boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("null pointer in `{field}`")]
    Null { field: &'static str },
    #[error("`{field}` is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },
    #[error("unsupported backend ABI version {found} (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}

/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays
/// alive and unmodified for `'a`.
unsafe fn read_str<'a>(ptr: *const c_char, field: &'static str) -> Result<&'a str, ViewError> {
    if ptr.is_null() {
        return Err(ViewError::Null { field });
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    let s = unsafe { CStr::from_ptr(ptr) };
    s.to_str().map_err(|_| ViewError::InvalidUtf8 { field })
}

/// # Safety
///
/// `ptr` must be null (only if `len == 0`) or point to `len` consecutive
/// elements valid for `'a`.
unsafe fn read_slice<'a, T>(
    ptr: *const T,
    len: usize,
    field: &'static str,
) -> Result<&'a [T], ViewError> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(ViewError::Null { field });
    }
    // SAFETY: non-null with `len` elements per the caller's contract.
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// The configuration block as seen by a backend.
#[derive(Debug, Clone, Copy)]
pub struct PluginConfig<'a> {
    raw: &'a DtltoConfig,
    name: &'a str,
}

impl<'a> PluginConfig<'a> {
    /// # Safety
    ///
    /// `cfg` must point to a config whose strings, context and callbacks
    /// stay valid for `'a`.
    pub unsafe fn from_raw(cfg: *const DtltoConfig) -> Result<Self, ViewError> {
        // SAFETY: null-checked by `as_ref`; validity per the caller's contract.
        let raw = unsafe { cfg.as_ref() }.ok_or(ViewError::Null { field: "config" })?;
        // SAFETY: same contract covers the name string.
        let name = unsafe { read_str(raw.dbs_name, "dbs_name") }?;
        Ok(Self { raw, name })
    }

    /// Backend identifier, verbatim as configured.
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn abi_version(&self) -> u32 {
        self.raw.abi_version
    }

    /// Whether the host speaks the ABI version this crate was built for.
    pub fn check_version(&self) -> Result<(), ViewError> {
        if self.raw.abi_version == DTLTO_ABI_VERSION {
            Ok(())
        } else {
            Err(ViewError::VersionMismatch {
                found: self.raw.abi_version,
                expected: DTLTO_ABI_VERSION,
            })
        }
    }

    /// Whether the identifier requests the mock test mode.
    pub fn is_test_mode(&self) -> bool {
        self.name.contains("::test")
    }

    pub fn emit_error(&self, message: &str) {
        self.emit(self.raw.emit_error, message);
    }

    pub fn emit_warn(&self, message: &str) {
        self.emit(self.raw.emit_warn, message);
    }

    fn emit(&self, callback: EmitDiagFn, message: &str) {
        let message = CString::new(message.replace('\0', " ")).unwrap_or_default();
        // SAFETY: callback and context were validated together in `from_raw`
        // and outlive `'a`; the message lives until the call returns.
        unsafe { callback(self.raw.diag_context, message.as_ptr()) }
    }
}

/// One work item as seen by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeView<'a> {
    pub module_id: &'a str,
    pub module_path: &'a str,
    pub module_size: usize,
    pub summary_index_path: &'a str,
    pub native_object_path: &'a str,
    pub imports: Vec<&'a str>,
    pub target_triple: &'a str,
    pub task_number: usize,
}

impl<'a> NodeView<'a> {
    /// # Safety
    ///
    /// Every string and the import array in `node` must stay valid for `'a`.
    pub unsafe fn from_raw(node: &'a DtltoBitcodeNode) -> Result<Self, ViewError> {
        // SAFETY: all reads below are covered by the caller's contract.
        unsafe {
            let import_ptrs = read_slice(node.imports_list, node.imports_list_size, "imports_list")?;
            let imports = import_ptrs
                .iter()
                .map(|&ptr| read_str(ptr, "imports_list"))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Self {
                module_id: read_str(node.module_id, "module_id")?,
                module_path: read_str(node.module_path, "module_path")?,
                module_size: node.module_size,
                summary_index_path: read_str(node.summary_index_path, "summary_index_path")?,
                native_object_path: read_str(node.native_object_path, "native_object_path")?,
                imports,
                target_triple: read_str(node.target_triple, "target_triple")?,
                task_number: node.task_number,
            })
        }
    }
}

/// Views over the node pointer array passed to the entry point.
///
/// # Safety
///
/// `nodes` must point to `count` pointers, each null or pointing to a node
/// valid for `'a` (see [`NodeView::from_raw`]).
pub unsafe fn nodes_from_raw<'a>(
    nodes: *const *const DtltoBitcodeNode,
    count: usize,
) -> Result<Vec<NodeView<'a>>, ViewError> {
    // SAFETY: covered by the caller's contract.
    unsafe {
        read_slice(nodes, count, "nodes")?
            .iter()
            .map(|&ptr| {
                let node = ptr.as_ref().ok_or(ViewError::Null { field: "nodes" })?;
                NodeView::from_raw(node)
            })
            .collect()
    }
}

/// Views over the compiler argument vector passed to the entry point.
///
/// # Safety
///
/// `argv` must point to `argc` NUL-terminated strings valid for `'a`.
pub unsafe fn args_from_raw<'a>(
    argv: *const *const c_char,
    argc: usize,
) -> Result<Vec<&'a str>, ViewError> {
    // SAFETY: covered by the caller's contract.
    unsafe {
        read_slice(argv, argc, "argv")?
            .iter()
            .map(|&ptr| read_str(ptr, "argv"))
            .collect()
    }
}
