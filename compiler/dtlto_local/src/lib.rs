//! Local Distributed ThinLTO Backend
//!
//! Runs the backend half of distributed ThinLTO on the build machine
//! itself: one `clang` invocation per work item, spread across a bounded
//! pool of worker threads.
//!
//! Built as a `cdylib` this crate is the `local` backend library
//! (`libdtlto_local.so`, `dtlto_local.dll`) the orchestrator loads next
//! to the linker. As an `rlib` it provides [`LocalBackend`] for hosts that
//! link it in directly.
//!
//! # Test mode
//!
//! A backend identifier containing `::test` (e.g. `local::test`) skips the
//! compiler entirely and writes each item's module id into its object
//! path. This exercises the orchestration without a code generator.
//!
//! # Debugging
//!
//! - `RUST_LOG=dtlto_local=debug` - pool size and compiler path
//! - `RUST_LOG=dtlto_local=trace` - every child command line

mod backend;
mod error;
mod mock;
mod pool;

#[cfg(test)]
mod test_support;

use std::ffi::{c_char, c_int};

use dtlto_abi::{export, DtltoBitcodeNode, DtltoConfig};

pub use backend::{compiler_args, LocalBackend, COMPILER_NOT_FOUND};
pub use error::LocalError;

/// C entry point resolved by the orchestrator.
///
/// # Safety
///
/// Must be called with arguments satisfying the `dtltoPerformCodegen`
/// contract from `dtlto_abi`.
#[no_mangle]
#[allow(non_snake_case, reason = "symbol name is fixed by the plugin ABI")]
pub unsafe extern "C" fn dtltoPerformCodegen(
    cfg: *const DtltoConfig,
    nodes_num: usize,
    nodes: *const *const DtltoBitcodeNode,
    argc: usize,
    argv: *const *const c_char,
) -> c_int {
    // SAFETY: forwarded from the caller's contract.
    unsafe { export::perform_codegen(&LocalBackend::new(), cfg, nodes_num, nodes, argc, argv) }
}
