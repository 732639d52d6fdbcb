//! Distributed ThinLTO Code Generation
//!
//! Linker-side orchestration of distributed ThinLTO: register bitcode
//! modules, run whole-program summary analysis once, hand the selected
//! modules to a pluggable backend, and read the native objects back.
//!
//! # Architecture
//!
//! ```text
//! InputModule ──► UnitRegistry ──► run_thin_link ──► resolve_and_invoke ──► harvest
//!                 (temp paths)     (SummaryAnalyzer)  (Backend: plugin or     (ObjectSink)
//!                                                       in-process)
//!                      ▲                                                        │
//!                      └──────────────── cleanup on session drop ◄──────────────┘
//! ```
//!
//! [`CodegenSession`] drives the phases and guarantees that every temp file
//! it derived is removed exactly once, whichever way the session ends.
//!
//! # Backends
//!
//! - [`Backend::Plugin`]: loads `{prefix}dtlto_{name}{suffix}` next to the
//!   executable and calls its `dtltoPerformCodegen` entry point
//! - [`Backend::InProcess`]: any [`dtlto_abi::CodegenBackend`] linked into the host
//!
//! # Debugging
//!
//! Call [`init_tracing`] and set `RUST_LOG`:
//! - `RUST_LOG=dtlto_codegen=debug` - phase boundaries and counts
//! - `RUST_LOG=dtlto_codegen=trace` - every unit, task slot and removal

mod config;
mod diagnostics;
pub mod dispatch;
mod error;
pub mod flags;
mod harvest;
mod outputs;
mod registry;
mod session;
mod temp_files;
pub mod thin_link;
mod unit;

use std::sync::Once;

pub use config::CodegenConfig;
pub use diagnostics::{
    buffer_handler, callback_handler, silent_handler, tracing_handler, BufferDiagnosticHandler,
    DiagnosticHandler, Severity, SharedDiagnostics,
};
pub use dispatch::{resolve_and_invoke, Backend, PluginLibrary};
pub use error::{CodegenError, ErrorList};
pub use flags::{map_codegen_options, CodegenOptions};
pub use harvest::harvest;
pub use outputs::{ObjectSink, TaskOutput, TaskOutputs};
pub use registry::{InputKind, InputModule, UnitRegistry};
pub use session::{run_codegen, CodegenSession, CodegenSummary};
pub use temp_files::save_buffer;
pub use thin_link::{run_thin_link, AnalysisError, SummaryAnalyzer, TaskSlot};
pub use unit::{CompilationUnit, UnitState};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber from `RUST_LOG`.
///
/// Safe to call multiple times; only the first call installs a subscriber,
/// and only if `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
