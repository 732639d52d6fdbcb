//! Session-wide settings.

use std::path::{Path, PathBuf};

use crate::diagnostics::{tracing_handler, SharedDiagnostics};
use crate::error::CodegenError;

/// Marker in a backend identifier that selects mock code generation.
const TEST_MODE_MARKER: &str = "::test";

/// Settings for one codegen session.
///
/// Created once and borrowed by every phase; never rebuilt per unit.
#[derive(Debug, Clone)]
pub struct CodegenConfig {
    backend: String,
    executable: Option<PathBuf>,
    plugin_dir: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    disable_temp_removal: bool,
    threads: usize,
    diagnostics: SharedDiagnostics,
    session_tag: String,
}

impl CodegenConfig {
    /// Configuration for `backend` (e.g. `local`, `local::test`, `dist:queue`).
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            executable: None,
            plugin_dir: None,
            work_dir: None,
            disable_temp_removal: false,
            threads: 0,
            diagnostics: tracing_handler(),
            session_tag: format!("{:x}", std::process::id()),
        }
    }

    /// Anchor backend lookup at this executable instead of the running one.
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Search this directory for backend libraries before the executable's.
    #[must_use]
    pub fn with_plugin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plugin_dir = Some(dir.into());
        self
    }

    /// Directory receiving renamed archive-member copies.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Keep temp files after the session (for debugging).
    #[must_use]
    pub fn with_temp_removal_disabled(mut self, disabled: bool) -> Self {
        self.disable_temp_removal = disabled;
        self
    }

    /// Thin-link worker threads (0 = hardware concurrency).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: SharedDiagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Override the disambiguator embedded in derived paths.
    #[must_use]
    pub fn with_session_tag(mut self, tag: impl Into<String>) -> Self {
        self.session_tag = tag.into();
        self
    }

    /// The full backend identifier.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// The part of the identifier naming the backend library.
    pub fn backend_name(&self) -> &str {
        self.backend
            .split_once(':')
            .map_or(self.backend.as_str(), |(name, _)| name)
    }

    pub fn is_test_mode(&self) -> bool {
        self.backend.contains(TEST_MODE_MARKER)
    }

    /// The host executable, canonicalized when possible.
    pub fn executable(&self) -> Result<PathBuf, CodegenError> {
        let exe = match &self.executable {
            Some(path) if path.as_os_str().is_empty() => {
                return Err(CodegenError::ExecutableNotFound {
                    message: "explicit executable path is empty".to_string(),
                })
            }
            Some(path) => path.clone(),
            None => std::env::current_exe().map_err(|e| CodegenError::ExecutableNotFound {
                message: e.to_string(),
            })?,
        };
        Ok(exe.canonicalize().unwrap_or(exe))
    }

    pub fn plugin_dir(&self) -> Option<&Path> {
        self.plugin_dir.as_deref()
    }

    /// The configured work directory, or the current directory.
    pub fn work_dir(&self) -> Result<PathBuf, CodegenError> {
        match &self.work_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().map_err(|e| CodegenError::io("access", ".", e)),
        }
    }

    pub fn disable_temp_removal(&self) -> bool {
        self.disable_temp_removal
    }

    /// Thin-link concurrency, resolving 0 to the hardware thread count.
    pub fn threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    }

    pub fn diagnostics(&self) -> &SharedDiagnostics {
        &self.diagnostics
    }

    /// Disambiguator embedded in every derived path (hex process id).
    pub fn session_tag(&self) -> &str {
        &self.session_tag
    }

    pub fn emit_error(&self, message: &str) {
        self.diagnostics.error(message);
    }

    pub fn emit_warn(&self, message: &str) {
        self.diagnostics.warn(message);
    }
}
