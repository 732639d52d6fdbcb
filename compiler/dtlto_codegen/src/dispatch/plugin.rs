//! Dynamically loaded backend libraries.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use dtlto_abi::{CStrArray, HostConfig, NodeTable, PerformCodegenFn, PERFORM_CODEGEN_SYMBOL};
use libloading::Library;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::CodegenConfig;
use crate::error::CodegenError;

/// `{prefix}dtlto_{name}{suffix}`, e.g. `libdtlto_local.so`.
pub fn library_file_name(backend_name: &str) -> String {
    format!("{DLL_PREFIX}dtlto_{backend_name}{DLL_SUFFIX}")
}

/// Candidate locations for the configured backend, in search order:
/// the plugin directory, the executable's directory, then `../lib`.
pub fn search_paths(config: &CodegenConfig) -> Result<Vec<PathBuf>, CodegenError> {
    let file = library_file_name(config.backend_name());
    let mut dirs = Vec::new();
    if let Some(dir) = config.plugin_dir() {
        dirs.push(dir.to_path_buf());
    }
    let exe = config.executable()?;
    if let Some(exe_dir) = exe.parent() {
        dirs.push(exe_dir.to_path_buf());
        dirs.push(exe_dir.join("..").join("lib"));
    }
    Ok(dirs.into_iter().map(|dir| dir.join(&file)).collect())
}

/// Libraries loaded by [`PluginLibrary::resolve`], kept until process exit.
static PERMANENT: OnceLock<Mutex<FxHashMap<PathBuf, Arc<PluginLibrary>>>> = OnceLock::new();

/// A loaded backend library and its entry point.
pub struct PluginLibrary {
    path: PathBuf,
    entry: PerformCodegenFn,
    // Declared last: `entry` points into this library.
    _library: Library,
}

impl PluginLibrary {
    /// Find and load the backend named by `config`.
    ///
    /// The library stays loaded for the rest of the process; later sessions
    /// resolving the same file share it.
    pub fn resolve(config: &CodegenConfig) -> Result<Arc<Self>, CodegenError> {
        let candidates = search_paths(config)?;
        let Some(path) = candidates.iter().find(|p| p.is_file()).cloned() else {
            let searched: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            return Err(CodegenError::BackendNotFound {
                backend: config.backend().to_string(),
                reason: format!("not found in [{}]", searched.join(", ")),
            });
        };

        let mut loaded = PERMANENT.get_or_init(Mutex::default).lock();
        if let Some(library) = loaded.get(&path) {
            return Ok(Arc::clone(library));
        }
        let library = Arc::new(Self::open_for(config.backend(), &path)?);
        loaded.insert(path, Arc::clone(&library));
        Ok(library)
    }

    /// Load a backend library from an explicit path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CodegenError> {
        let path = path.as_ref();
        let name = path.file_stem().map_or_else(String::new, |s| s.to_string_lossy().into_owned());
        Self::open_for(&name, path)
    }

    fn open_for(backend: &str, path: &Path) -> Result<Self, CodegenError> {
        // SAFETY: loading runs the library's initializers; backend libraries
        // are trusted components installed alongside the host.
        let library = unsafe { Library::new(path) }.map_err(|e| CodegenError::BackendNotFound {
            backend: backend.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        // SAFETY: the symbol's type is fixed by the plugin ABI.
        let entry = unsafe { library.get::<PerformCodegenFn>(PERFORM_CODEGEN_SYMBOL.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|_| CodegenError::EntryPointMissing {
                path: path.to_path_buf(),
                symbol: PERFORM_CODEGEN_SYMBOL,
            })?;
        debug!(path = %path.display(), "loaded backend library");
        Ok(Self {
            path: path.to_path_buf(),
            entry,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Call the entry point with every work item in `table`.
    pub fn invoke(
        &self,
        host: &HostConfig<'_>,
        table: &NodeTable,
        args: &[String],
    ) -> Result<i32, CodegenError> {
        let argv = CStrArray::new("argv", args).map_err(|e| CodegenError::InvalidDescriptor {
            message: e.to_string(),
        })?;
        let nodes = table.node_ptrs();
        // SAFETY: the config block, node table and argv own every buffer the
        // raw pointers reach, and all three outlive this synchronous call.
        let code = unsafe {
            (self.entry)(
                host.raw(),
                nodes.len(),
                nodes.as_ptr(),
                argv.len(),
                argv.as_ptr(),
            )
        };
        Ok(code)
    }
}

impl fmt::Debug for PluginLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLibrary").field("path", &self.path).finish_non_exhaustive()
    }
}
