//! Handing selected units to a backend.
//!
//! Every backend sees the same flat descriptors: a [`NodeTable`] is built
//! from the units in dispatch order, then either passed to a backend linked
//! into the host or through the C entry point of a loaded library.
//!
//! The call is synchronous. Backends own scheduling and retries.

mod plugin;

use std::fmt;

use dtlto_abi::{CodegenBackend, HostConfig, NodeTable};
use tracing::debug;

use crate::config::CodegenConfig;
use crate::diagnostics::DiagnosticHandler;
use crate::error::CodegenError;
use crate::unit::CompilationUnit;

pub use plugin::{library_file_name, search_paths, PluginLibrary};

/// Where code generation runs.
pub enum Backend {
    /// The library named by the configured backend identifier, resolved
    /// at dispatch time. Once loaded it stays loaded until process exit.
    Plugin,
    /// An already loaded library.
    Library(PluginLibrary),
    /// An implementation linked into the host.
    InProcess(Box<dyn CodegenBackend>),
}

impl Backend {
    pub fn in_process(backend: impl CodegenBackend + 'static) -> Self {
        Self::InProcess(Box::new(backend))
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plugin => write!(f, "Backend::Plugin"),
            Self::Library(lib) => f.debug_tuple("Backend::Library").field(lib).finish(),
            Self::InProcess(_) => write!(f, "Backend::InProcess"),
        }
    }
}

fn descriptor_error(e: impl fmt::Display) -> CodegenError {
    CodegenError::InvalidDescriptor {
        message: e.to_string(),
    }
}

/// Flatten `units` into a node table, preserving order.
pub fn build_table(units: &[&CompilationUnit]) -> Result<NodeTable, CodegenError> {
    let mut table = NodeTable::with_capacity(units.len());
    for unit in units {
        table.push(unit.node_desc()).map_err(descriptor_error)?;
    }
    Ok(table)
}

/// Run `backend` over `units` with the common compiler `args`.
///
/// Resolution failures abort before any codegen. A non-zero backend status
/// becomes [`CodegenError::BackendCodegenFailed`].
pub fn resolve_and_invoke(
    config: &CodegenConfig,
    backend: &Backend,
    units: &[&CompilationUnit],
    args: &[String],
) -> Result<(), CodegenError> {
    let table = build_table(units)?;
    let diagnostics: &DiagnosticHandler = config.diagnostics();
    let host = HostConfig::new(config.backend(), diagnostics).map_err(descriptor_error)?;
    debug!(backend = config.backend(), items = table.len(), ?args, "dispatching codegen");

    let code = match backend {
        Backend::Plugin => PluginLibrary::resolve(config)?.invoke(&host, &table, args)?,
        Backend::Library(library) => library.invoke(&host, &table, args)?,
        Backend::InProcess(backend) => {
            let views = table.views().map_err(descriptor_error)?;
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            backend.perform_codegen(&host.view(), &views, &args)
        }
    };

    debug!(backend = config.backend(), code, "backend returned");
    if code == 0 {
        Ok(())
    } else {
        Err(CodegenError::BackendCodegenFailed {
            backend: config.backend().to_string(),
            code,
        })
    }
}
