//! Host side of the configuration block.

use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::raw::{DtltoConfig, DtltoDiagContext, DTLTO_ABI_VERSION};
use crate::table::TableError;
use crate::view::PluginConfig;

/// Receiver for diagnostics a backend sends back across the boundary.
pub trait DiagnosticSink: Sync {
    fn emit_error(&self, message: &str);
    fn emit_warn(&self, message: &str);
}

type SinkRef<'s> = &'s (dyn DiagnosticSink + 's);

/// An owned [`DtltoConfig`] whose callbacks forward into a [`DiagnosticSink`].
///
/// The raw block points into heap storage owned by this value, so it stays
/// valid when the `HostConfig` is moved.
pub struct HostConfig<'s> {
    _name: CString,
    _sink: Box<SinkRef<'s>>,
    raw: DtltoConfig,
}

unsafe extern "C" fn forward_error(ctx: *const DtltoDiagContext, message: *const c_char) {
    forward(ctx, message, |sink, m| sink.emit_error(m));
}

unsafe extern "C" fn forward_warn(ctx: *const DtltoDiagContext, message: *const c_char) {
    forward(ctx, message, |sink, m| sink.emit_warn(m));
}

fn forward(
    ctx: *const DtltoDiagContext,
    message: *const c_char,
    emit: impl FnOnce(&dyn DiagnosticSink, &str),
) {
    if ctx.is_null() || message.is_null() {
        return;
    }
    // SAFETY: `ctx` is the boxed sink reference installed by `HostConfig::new`,
    // alive for as long as the config block is reachable.
    let sink = unsafe { *ctx.cast::<SinkRef<'_>>() };
    // SAFETY: the backend passes a NUL-terminated message valid for the call.
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    // A panic must not unwind into the backend's frames; the message is dropped.
    let _ = catch_unwind(AssertUnwindSafe(|| emit(sink, &message)));
}

impl<'s> HostConfig<'s> {
    pub fn new(backend: &str, sink: &'s dyn DiagnosticSink) -> Result<Self, TableError> {
        let name = CString::new(backend).map_err(|_| TableError {
            field: "dbs_name",
            value: backend.to_string(),
        })?;
        let sink: Box<SinkRef<'s>> = Box::new(sink);
        let raw = DtltoConfig {
            abi_version: DTLTO_ABI_VERSION,
            dbs_name: name.as_ptr(),
            diag_context: std::ptr::from_ref::<SinkRef<'s>>(&*sink).cast(),
            emit_error: forward_error,
            emit_warn: forward_warn,
        };
        Ok(Self {
            _name: name,
            _sink: sink,
            raw,
        })
    }

    /// The block handed to a backend library.
    pub fn raw(&self) -> &DtltoConfig {
        &self.raw
    }

    /// The block as a backend linked into the host sees it.
    pub fn view(&self) -> PluginConfig<'_> {
        // SAFETY: name, sink and callbacks are owned by `self`; a name that
        // passed `CString::new` from `&str` is valid UTF-8.
        match unsafe { PluginConfig::from_raw(&self.raw) } {
            Ok(view) => view,
            Err(e) => unreachable!("host config is always well formed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests;
