//! Compilation units and their lifecycle.

use std::path::Path;

use dtlto_abi::NodeDesc;

/// Suffix of the per-unit summary index written after thin-link.
pub const SUMMARY_INDEX_EXT: &str = ".thinlto.bc";
/// Suffix of the per-unit native object a backend writes.
pub const NATIVE_OBJECT_EXT: &str = ".native.o";

/// Where a unit is in the codegen pipeline.
///
/// ```text
/// Pending --thin-link--> Selected --harvest--> Consumed
/// ```
///
/// Units thin-link never visits stay `Pending` and are never dispatched.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum UnitState {
    /// Not (yet) known to need codegen.
    #[default]
    Pending,
    /// Needs codegen; will be dispatched.
    Selected,
    /// Object read back; must not be harvested again.
    Consumed,
}

/// One bitcode module entering the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    id: String,
    path: String,
    size: usize,
    target_triple: String,
    summary_index_path: String,
    native_object_path: String,
    imports: Vec<String>,
    task_number: Option<usize>,
    needs_deletion: bool,
    state: UnitState,
}

/// `{path}.{tag}{ext}`.
pub fn derived_path(path: &str, tag: &str, ext: &str) -> String {
    format!("{path}.{tag}{ext}")
}

impl CompilationUnit {
    pub(crate) fn new(
        id: String,
        path: String,
        size: usize,
        target_triple: String,
        tag: &str,
        needs_deletion: bool,
    ) -> Self {
        let summary_index_path = derived_path(&path, tag, SUMMARY_INDEX_EXT);
        let native_object_path = derived_path(&path, tag, NATIVE_OBJECT_EXT);
        Self {
            id,
            path,
            size,
            target_triple,
            summary_index_path,
            native_object_path,
            imports: Vec::new(),
            task_number: None,
            needs_deletion,
            state: UnitState::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.path)
    }

    /// Size of the bitcode buffer in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn target_triple(&self) -> &str {
        &self.target_triple
    }

    pub fn summary_index_path(&self) -> &Path {
        Path::new(&self.summary_index_path)
    }

    pub fn native_object_path(&self) -> &Path {
        Path::new(&self.native_object_path)
    }

    /// Modules this unit's codegen imports from; empty before thin-link.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Task assigned by thin-link, if any.
    pub fn task_number(&self) -> Option<usize> {
        self.task_number
    }

    /// True when the bitcode file itself is a temp copy.
    pub fn needs_deletion(&self) -> bool {
        self.needs_deletion
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    /// True unless the unit is waiting for codegen.
    pub fn is_excluded(&self) -> bool {
        self.state != UnitState::Selected
    }

    /// Mark the unit as needing codegen for `task`.
    ///
    /// Returns true only on the `Pending -> Selected` transition. Selecting
    /// an already selected unit moves it to `task`; a consumed unit is never
    /// reselected.
    pub(crate) fn select(&mut self, task: usize, imports: Vec<String>) -> bool {
        let was_pending = match self.state {
            UnitState::Consumed => return false,
            UnitState::Pending => true,
            UnitState::Selected => false,
        };
        self.task_number = Some(task);
        self.imports = imports;
        self.state = UnitState::Selected;
        was_pending
    }

    pub(crate) fn consume(&mut self) {
        debug_assert_eq!(self.state, UnitState::Selected);
        self.state = UnitState::Consumed;
    }

    /// Every file this unit may have left on disk.
    pub fn temp_paths(&self) -> impl Iterator<Item = &Path> {
        let source = self.needs_deletion.then(|| self.path());
        [self.summary_index_path(), self.native_object_path()]
            .into_iter()
            .chain(source)
    }

    /// The work-item description handed to a backend.
    pub(crate) fn node_desc(&self) -> NodeDesc<'_> {
        NodeDesc {
            module_id: &self.id,
            module_path: &self.path,
            module_size: self.size,
            summary_index_path: &self.summary_index_path,
            native_object_path: &self.native_object_path,
            imports: &self.imports,
            target_triple: &self.target_triple,
            task_number: self.task_number.unwrap_or_default(),
        }
    }
}
