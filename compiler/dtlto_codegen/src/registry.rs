//! The unit registry.
//!
//! Units are kept in insertion order and indexed by id. Archive members are
//! renamed and written out under a disambiguated name so two archives
//! contributing `a.o` never share derived paths.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::config::CodegenConfig;
use crate::error::CodegenError;
use crate::temp_files::{absolute_normalized, remove_temp_file, save_buffer};
use crate::unit::{CompilationUnit, UnitState};

/// Where an input module came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputKind {
    /// A bitcode file on disk; its id is its path.
    File,
    /// A member extracted from an archive; its id is `archive(member)`.
    ArchiveMember,
}

/// One module handed to the registry.
#[derive(Copy, Clone, Debug)]
pub struct InputModule<'a> {
    pub id: &'a str,
    pub buffer: &'a [u8],
    pub target_triple: &'a str,
    pub kind: InputKind,
}

impl<'a> InputModule<'a> {
    pub fn file(id: &'a str, buffer: &'a [u8], target_triple: &'a str) -> Self {
        Self {
            id,
            buffer,
            target_triple,
            kind: InputKind::File,
        }
    }

    pub fn archive_member(id: &'a str, buffer: &'a [u8], target_triple: &'a str) -> Self {
        Self {
            id,
            buffer,
            target_triple,
            kind: InputKind::ArchiveMember,
        }
    }
}

/// Insertion-ordered units keyed by id.
#[derive(Debug)]
pub struct UnitRegistry {
    units: Vec<CompilationUnit>,
    index: FxHashMap<String, usize>,
    tag: String,
    work_dir: PathBuf,
    cleaned: bool,
}

impl UnitRegistry {
    /// A registry deriving paths with `tag` and writing member copies into `work_dir`.
    pub fn new(tag: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            units: Vec::new(),
            index: FxHashMap::default(),
            tag: tag.into(),
            work_dir: work_dir.into(),
            cleaned: false,
        }
    }

    pub fn for_config(config: &CodegenConfig) -> Result<Self, CodegenError> {
        Ok(Self::new(config.session_tag(), config.work_dir()?))
    }

    /// Register one input module.
    ///
    /// Archive members are renamed to `{basename}.{tag}.o` (plus a numeric
    /// suffix on collision) and their bytes written under `work_dir`.
    pub fn register(&mut self, input: InputModule<'_>) -> Result<&CompilationUnit, CodegenError> {
        if input.id.is_empty() {
            return Err(CodegenError::InvalidInput {
                id: String::new(),
                message: "module id is empty".to_string(),
            });
        }

        let unit = match input.kind {
            InputKind::File => {
                if self.index.contains_key(input.id) {
                    return Err(CodegenError::InvalidInput {
                        id: input.id.to_string(),
                        message: "module registered twice".to_string(),
                    });
                }
                let path = absolute_normalized(Path::new(input.id))?;
                self.new_unit(input.id.to_string(), &path, input, false)
            }
            InputKind::ArchiveMember => {
                let id = self.member_id(input.id);
                let copy = absolute_normalized(&self.work_dir.join(&id))?;
                save_buffer(input.buffer, &copy)?;
                debug!(member = input.id, id = %id, path = %copy.display(), "saved archive member");
                self.new_unit(id, &copy, input, true)
            }
        };

        trace!(
            id = unit.id(),
            size = unit.size(),
            index = %unit.summary_index_path().display(),
            object = %unit.native_object_path().display(),
            "registered unit"
        );
        let slot = self.units.len();
        self.index.insert(unit.id().to_string(), slot);
        self.units.push(unit);
        Ok(&self.units[slot])
    }

    fn new_unit(
        &self,
        id: String,
        path: &Path,
        input: InputModule<'_>,
        needs_deletion: bool,
    ) -> CompilationUnit {
        CompilationUnit::new(
            id,
            path.display().to_string(),
            input.buffer.len(),
            input.target_triple.to_string(),
            &self.tag,
            needs_deletion,
        )
    }

    /// `{basename}.{tag}.o`, or `{basename}.{tag}.{n}.o` when taken.
    fn member_id(&self, id: &str) -> String {
        let base = Path::new(id)
            .file_name()
            .map_or_else(|| id.to_string(), |name| name.to_string_lossy().into_owned());
        let mut candidate = format!("{base}.{}.o", self.tag);
        let mut n = 1usize;
        while self.index.contains_key(&candidate) {
            candidate = format!("{base}.{}.{n}.o", self.tag);
            n += 1;
        }
        candidate
    }

    pub fn get(&self, id: &str) -> Option<&CompilationUnit> {
        self.index.get(id).map(|&i| &self.units[i])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut CompilationUnit> {
        self.index.get(id).map(|&i| &mut self.units[i])
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, CompilationUnit> {
        self.units.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, CompilationUnit> {
        self.units.iter_mut()
    }

    /// Selected units, largest first; equal sizes keep registration order.
    pub fn dispatch_order(&self) -> Vec<&CompilationUnit> {
        let mut selected: Vec<&CompilationUnit> = self
            .units
            .iter()
            .filter(|u| u.state() == UnitState::Selected)
            .collect();
        selected.sort_by(|a, b| b.size().cmp(&a.size()));
        selected
    }

    /// Remove every unit's temp files. Runs at most once.
    ///
    /// Returns the number of removals attempted.
    pub fn cleanup(&mut self, config: &CodegenConfig) -> usize {
        if std::mem::replace(&mut self.cleaned, true) {
            return 0;
        }
        if config.disable_temp_removal() {
            debug!(units = self.units.len(), "temp file removal disabled");
            return 0;
        }

        let mut attempted = 0;
        for path in self.units.iter().flat_map(CompilationUnit::temp_paths) {
            attempted += 1;
            match remove_temp_file(path) {
                Ok(removed) => trace!(path = %path.display(), removed, "cleanup"),
                Err(e) => config.emit_warn(&format!("Can't remove file {}: {e}", path.display())),
            }
        }
        debug!(units = self.units.len(), attempted, "cleaned up temp files");
        attempted
    }

    pub fn is_cleaned(&self) -> bool {
        self.cleaned
    }
}

#[cfg(test)]
mod tests;
