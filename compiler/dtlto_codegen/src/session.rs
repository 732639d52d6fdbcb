//! One distributed codegen session, end to end.
//!
//! ```text
//! add_input* -> thin link -> dispatch -> harvest -> cleanup
//! ```
//!
//! Cleanup runs when the session is dropped, so temp files are released on
//! every exit path, including early returns through `?`.

use tracing::{debug, info};

use crate::config::CodegenConfig;
use crate::dispatch::{resolve_and_invoke, Backend};
use crate::error::CodegenError;
use crate::flags::{map_codegen_options, CodegenOptions};
use crate::harvest::harvest;
use crate::outputs::ObjectSink;
use crate::registry::{InputModule, UnitRegistry};
use crate::thin_link::{run_thin_link, SummaryAnalyzer};
use crate::unit::CompilationUnit;

/// Counts from a successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodegenSummary {
    pub registered: usize,
    pub selected: usize,
    pub harvested: usize,
}

/// A codegen session borrowing its configuration.
pub struct CodegenSession<'cfg> {
    config: &'cfg CodegenConfig,
    registry: UnitRegistry,
}

impl<'cfg> CodegenSession<'cfg> {
    pub fn new(config: &'cfg CodegenConfig) -> Result<Self, CodegenError> {
        Ok(Self {
            config,
            registry: UnitRegistry::for_config(config)?,
        })
    }

    pub fn config(&self) -> &CodegenConfig {
        self.config
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn add_input(&mut self, input: InputModule<'_>) -> Result<&CompilationUnit, CodegenError> {
        self.registry.register(input)
    }

    /// Thin link, dispatch and harvest.
    ///
    /// Objects land in `objects` as they are harvested. A failed backend
    /// call does not stop harvesting; its error is joined with any harvest
    /// errors, and whatever was harvested stays in `objects`.
    pub fn run(
        &mut self,
        analyzer: &mut dyn SummaryAnalyzer,
        options: &CodegenOptions,
        backend: &Backend,
        objects: &mut dyn ObjectSink,
    ) -> Result<CodegenSummary, CodegenError> {
        let selected = run_thin_link(self.config, analyzer, &mut self.registry, objects)?;

        let args = map_codegen_options(options);
        let dispatch_error = match resolve_and_invoke(
            self.config,
            backend,
            &self.registry.dispatch_order(),
            &args,
        ) {
            Ok(()) => None,
            Err(e @ CodegenError::BackendCodegenFailed { .. }) => Some(e),
            Err(e) => return Err(e),
        };

        let harvested = harvest(&mut self.registry, objects);
        let summary = CodegenSummary {
            registered: self.registry.len(),
            selected,
            harvested: *harvested.as_ref().unwrap_or(&0),
        };
        match (dispatch_error, harvested) {
            (None, Ok(_)) => {
                info!(
                    units = summary.registered,
                    selected = summary.selected,
                    harvested = summary.harvested,
                    "distributed codegen complete"
                );
                Ok(summary)
            }
            (Some(e), Ok(_)) | (None, Err(e)) => Err(e),
            (Some(dispatch), Err(harvest)) => Err(dispatch.join(harvest)),
        }
    }

    /// End the session now; returns the number of removals attempted.
    pub fn finish(mut self) -> usize {
        self.registry.cleanup(self.config)
    }
}

impl Drop for CodegenSession<'_> {
    fn drop(&mut self) {
        let attempted = self.registry.cleanup(self.config);
        if attempted > 0 {
            debug!(attempted, "session cleanup on drop");
        }
    }
}

/// Register `inputs` and run one complete session.
pub fn run_codegen(
    config: &CodegenConfig,
    inputs: &[InputModule<'_>],
    analyzer: &mut dyn SummaryAnalyzer,
    options: &CodegenOptions,
    backend: &Backend,
    objects: &mut dyn ObjectSink,
) -> Result<CodegenSummary, CodegenError> {
    let mut session = CodegenSession::new(config)?;
    for input in inputs {
        session.add_input(*input)?;
    }
    session.run(analyzer, options, backend, objects)
}

#[cfg(test)]
mod tests;
