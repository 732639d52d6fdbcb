//! `clang` driven code generation.

use std::path::{Path, PathBuf};
use std::process::Command;

use dtlto_abi::{CodegenBackend, NodeView, PluginConfig, CODEGEN_FAILED, CODEGEN_OK};
use tracing::{debug, trace};

use crate::error::LocalError;
use crate::{mock, pool};

/// Returned when the code generator cannot be located (the `ENOENT` value).
pub const COMPILER_NOT_FOUND: i32 = 2;

/// Code generator looked up on `PATH` unless overridden.
const DEFAULT_COMPILER: &str = "clang";

/// The local backend.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    /// Explicit code generator; skips the `PATH` lookup.
    compiler: Option<PathBuf>,
    /// Program name searched on `PATH`.
    compiler_name: String,
    /// Worker threads (0 = hardware concurrency).
    jobs: usize,
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            compiler: None,
            compiler_name: DEFAULT_COMPILER.to_string(),
            jobs: 0,
        }
    }

    /// Use this code generator instead of searching `PATH`.
    #[must_use]
    pub fn with_compiler(mut self, path: impl Into<PathBuf>) -> Self {
        self.compiler = Some(path.into());
        self
    }

    /// Search `PATH` for a different program name.
    #[must_use]
    pub fn with_compiler_name(mut self, name: &str) -> Self {
        self.compiler_name = name.to_string();
        self
    }

    /// Set the worker count (0 = hardware concurrency).
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Locate the code generator.
    pub fn find_compiler(&self) -> Result<PathBuf, LocalError> {
        if let Some(path) = &self.compiler {
            return Ok(path.clone());
        }
        which::which(&self.compiler_name).map_err(|e| LocalError::CompilerNotFound {
            name: self.compiler_name.clone(),
            message: e.to_string(),
        })
    }

    fn compile(compiler: &Path, common: &[&str], node: &NodeView<'_>) -> Result<(), LocalError> {
        let args = compiler_args(common, node);
        trace!(compiler = %compiler.display(), ?args, "spawning codegen");

        let output = Command::new(compiler)
            .args(&args)
            .output()
            .map_err(|source| LocalError::Spawn {
                compiler: compiler.display().to_string(),
                module: node.module_id.to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(LocalError::Failed {
                compiler: compiler.display().to_string(),
                module: node.module_id.to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            })
        }
    }
}

/// Arguments for one child invocation: the common flags, then the
/// per-item ThinLTO backend compile of IR input.
pub fn compiler_args(common: &[&str], node: &NodeView<'_>) -> Vec<String> {
    let mut args: Vec<String> = common.iter().map(ToString::to_string).collect();
    args.extend([
        "-Wno-invalid-or-nonexistent-directory".to_string(),
        "-c".to_string(),
        "-x".to_string(),
        "ir".to_string(),
        format!("-fthinlto-index={}", node.summary_index_path),
        "-target".to_string(),
        node.target_triple.to_string(),
        "-o".to_string(),
        node.native_object_path.to_string(),
        node.module_path.to_string(),
    ]);
    args
}

impl CodegenBackend for LocalBackend {
    fn perform_codegen(
        &self,
        config: &PluginConfig<'_>,
        nodes: &[NodeView<'_>],
        args: &[&str],
    ) -> i32 {
        if config.is_test_mode() {
            return mock::perform_mock_codegen(config, nodes);
        }

        let compiler = match self.find_compiler() {
            Ok(compiler) => compiler,
            Err(e) => {
                config.emit_error(&e.to_string());
                return COMPILER_NOT_FOUND;
            }
        };
        debug!(
            compiler = %compiler.display(),
            items = nodes.len(),
            workers = pool::effective_jobs(self.jobs, nodes.len()),
            "local codegen"
        );

        let errors = pool::run_all(nodes, self.jobs, |node| {
            Self::compile(&compiler, args, node)
        });
        if errors.is_empty() {
            return CODEGEN_OK;
        }
        for e in &errors {
            config.emit_error(&e.to_string());
        }
        CODEGEN_FAILED
    }
}
