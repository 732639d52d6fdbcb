use crate::view::{NodeView, PluginConfig};

/// A code generation backend.
///
/// Implemented by backends that can be linked into the host directly, and
/// used by [`crate::export::perform_codegen`] to serve the C entry point of
/// a backend library. Both paths hand the backend the same views.
pub trait CodegenBackend: Send + Sync {
    /// Produce a native object at every node's `native_object_path`.
    ///
    /// Blocks until all work is done. Returns [`crate::CODEGEN_OK`] on
    /// success; any other value is reported to the user as a backend failure.
    fn perform_codegen(
        &self,
        config: &PluginConfig<'_>,
        nodes: &[NodeView<'_>],
        args: &[&str],
    ) -> i32;
}
