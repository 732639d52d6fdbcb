//! The thin-link step.
//!
//! Whole-program summary analysis is an external collaborator behind
//! [`SummaryAnalyzer`]. It runs exactly once per session and reports one
//! [`TaskSlot`] per task number; this module applies those slots to the
//! registry.
//!
//! Slot 0 is reserved for output the analyzer produces itself (e.g. a
//! regular-LTO partition) and never names a registered unit.

use tracing::{debug, trace};

use crate::config::CodegenConfig;
use crate::error::CodegenError;
use crate::outputs::ObjectSink;
use crate::registry::UnitRegistry;
use crate::temp_files::save_buffer;
use crate::unit::CompilationUnit;

/// Error type analyzers may return.
pub type AnalysisError = Box<dyn std::error::Error + Send + Sync>;

/// The analysis result for one task number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSlot {
    /// Module id the task belongs to; empty for unused slots.
    pub module: String,
    /// Serialized per-module summary index; empty when none is needed.
    pub summary_index: Vec<u8>,
    /// Modules the task imports from.
    pub imports: Vec<String>,
}

impl TaskSlot {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_summary_index(mut self, index: impl Into<Vec<u8>>) -> Self {
        self.summary_index = index.into();
        self
    }

    #[must_use]
    pub fn with_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports = imports.into_iter().map(Into::into).collect();
        self
    }
}

/// Whole-program summary analysis.
pub trait SummaryAnalyzer {
    /// Analyze every registered unit using up to `threads` workers.
    ///
    /// Returns the slots indexed by task number. Objects the analyzer
    /// generates itself go straight to `objects`.
    fn analyze(
        &mut self,
        units: &[CompilationUnit],
        threads: usize,
        objects: &mut dyn ObjectSink,
    ) -> Result<Vec<TaskSlot>, AnalysisError>;
}

/// Run the analyzer and apply its slots to the registry.
///
/// Returns the number of units selected for codegen.
pub fn run_thin_link(
    config: &CodegenConfig,
    analyzer: &mut dyn SummaryAnalyzer,
    registry: &mut UnitRegistry,
    objects: &mut dyn ObjectSink,
) -> Result<usize, CodegenError> {
    let threads = config.threads();
    debug!(units = registry.len(), threads, "running thin link");
    let slots = analyzer
        .analyze(registry.iter().as_slice(), threads, objects)
        .map_err(|e| CodegenError::Analysis {
            message: e.to_string(),
        })?;

    let mut selected = 0;
    for (task, slot) in slots.into_iter().enumerate().skip(1) {
        if slot.module.is_empty() {
            continue;
        }
        let unit = registry
            .get_mut(&slot.module)
            .ok_or_else(|| CodegenError::UnknownModule {
                module: slot.module.clone(),
                task,
            })?;
        if !slot.summary_index.is_empty() {
            save_buffer(&slot.summary_index, unit.summary_index_path())?;
        }
        trace!(task, module = %slot.module, imports = ?slot.imports, "selected for codegen");
        if unit.select(task, slot.imports) {
            selected += 1;
        }
    }
    debug!(selected, "thin link done");
    Ok(selected)
}
