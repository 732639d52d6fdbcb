//! Owned storage backing one backend call.
//!
//! The host copies every string into a `CString` here so the raw
//! structures can point at stable, NUL-terminated buffers. Dropping the
//! table after the call ends the borrow the backend was given.

use std::ffi::{c_char, CString};

use crate::raw::DtltoBitcodeNode;
use crate::view::{NodeView, ViewError};

/// A string that cannot be represented as a C string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{field}` contains an interior NUL byte: {value:?}")]
pub struct TableError {
    pub field: &'static str,
    pub value: String,
}

fn c_string(field: &'static str, value: &str) -> Result<CString, TableError> {
    CString::new(value).map_err(|_| TableError {
        field,
        value: value.to_string(),
    })
}

/// NUL-terminated copies of a string list plus the pointer array over them.
#[derive(Debug, Default)]
pub struct CStrArray {
    owned: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl CStrArray {
    pub fn new<I, S>(field: &'static str, items: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owned = items
            .into_iter()
            .map(|s| c_string(field, s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        // Moving a CString does not move its heap buffer.
        let ptrs = owned.iter().map(|s| s.as_ptr()).collect();
        Ok(Self { owned, ptrs })
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    /// Pointer to the first element, valid while `self` is alive.
    pub fn as_ptr(&self) -> *const *const c_char {
        self.ptrs.as_ptr()
    }
}

/// Host-side description of one work item.
#[derive(Debug, Clone, Copy)]
pub struct NodeDesc<'a> {
    pub module_id: &'a str,
    pub module_path: &'a str,
    pub module_size: usize,
    pub summary_index_path: &'a str,
    pub native_object_path: &'a str,
    pub imports: &'a [String],
    pub target_triple: &'a str,
    pub task_number: usize,
}

/// The node array for one backend call, in dispatch order.
#[derive(Debug, Default)]
pub struct NodeTable {
    strings: Vec<CString>,
    imports: Vec<CStrArray>,
    nodes: Vec<DtltoBitcodeNode>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            strings: Vec::with_capacity(capacity * 5),
            imports: Vec::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Append a node; its position is its dispatch index.
    pub fn push(&mut self, desc: NodeDesc<'_>) -> Result<(), TableError> {
        let mut keep = |field: &'static str, value: &str| -> Result<*const c_char, TableError> {
            let s = c_string(field, value)?;
            let ptr = s.as_ptr();
            self.strings.push(s);
            Ok(ptr)
        };

        let module_id = keep("module_id", desc.module_id)?;
        let module_path = keep("module_path", desc.module_path)?;
        let summary_index_path = keep("summary_index_path", desc.summary_index_path)?;
        let native_object_path = keep("native_object_path", desc.native_object_path)?;
        let target_triple = keep("target_triple", desc.target_triple)?;

        let imports = CStrArray::new("imports_list", desc.imports)?;
        let node = DtltoBitcodeNode {
            module_id,
            module_path,
            module_size: desc.module_size,
            summary_index_path,
            native_object_path,
            imports_list_size: imports.len(),
            imports_list: imports.as_ptr(),
            target_triple,
            task_number: desc.task_number,
        };
        self.imports.push(imports);
        self.nodes.push(node);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The pointer array handed to the entry point.
    pub fn node_ptrs(&self) -> Vec<*const DtltoBitcodeNode> {
        self.nodes.iter().map(std::ptr::from_ref).collect()
    }

    /// The same nodes as borrowed views, for backends linked into the host.
    pub fn views(&self) -> Result<Vec<NodeView<'_>>, ViewError> {
        self.nodes
            .iter()
            // SAFETY: every pointer in `node` targets a buffer owned by `self`.
            .map(|node| unsafe { NodeView::from_raw(node) })
            .collect()
    }
}

#[cfg(test)]
mod tests;
