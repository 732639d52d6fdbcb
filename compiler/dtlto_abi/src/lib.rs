//! Distributed ThinLTO Backend Interface
//!
//! The contract between the linker-side orchestrator and a code generation
//! backend. A backend is either linked into the host and called through
//! [`CodegenBackend`], or built as a dynamic library exporting
//! [`PERFORM_CODEGEN_SYMBOL`] with the [`PerformCodegenFn`] signature.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  NodeTable   ┌──────────────────┐   views    ┌──────────────┐
//! │ Orchestrator │─────────────▶│ DtltoBitcodeNode │───────────▶│   Backend    │
//! │  (host)      │  CStrArray   │ DtltoConfig      │  NodeView  │ (in-process  │
//! │              │◀─────────────│ (#[repr(C)])     │  Plugin-   │  or plugin)  │
//! └──────────────┘  callbacks   └──────────────────┘  Config    └──────────────┘
//! ```
//!
//! Every string in the flat structs is borrowed for the duration of one call.
//! Backends must copy anything they keep. Diagnostics travel back only
//! through the two callbacks in [`DtltoConfig`].
//!
//! # Writing a plugin
//!
//! ```ignore
//! use dtlto_abi::{export, CodegenBackend, DtltoBitcodeNode, DtltoConfig};
//!
//! #[no_mangle]
//! pub unsafe extern "C" fn dtltoPerformCodegen(
//!     cfg: *const DtltoConfig,
//!     nodes_num: usize,
//!     nodes: *const *const DtltoBitcodeNode,
//!     argc: usize,
//!     argv: *const *const std::ffi::c_char,
//! ) -> std::ffi::c_int {
//!     export::perform_codegen(&MyBackend, cfg, nodes_num, nodes, argc, argv)
//! }
//! ```

mod backend;
pub mod export;
mod host;
mod raw;
mod table;
mod view;

pub use backend::CodegenBackend;
pub use host::{DiagnosticSink, HostConfig};
pub use raw::{
    DtltoBitcodeNode, DtltoConfig, DtltoDiagContext, EmitDiagFn, PerformCodegenFn,
    CODEGEN_BAD_REQUEST, CODEGEN_FAILED, CODEGEN_OK, CODEGEN_PANICKED, DTLTO_ABI_VERSION,
    PERFORM_CODEGEN_SYMBOL,
};
pub use table::{CStrArray, NodeDesc, NodeTable, TableError};
pub use view::{args_from_raw, nodes_from_raw, NodeView, PluginConfig, ViewError};
