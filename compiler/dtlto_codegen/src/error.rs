//! Error types for the codegen session.
//!
//! Per-unit failures during harvesting and a failed backend call are not
//! fatal on their own; they are joined into one [`CodegenError::Multiple`]
//! so the caller sees every problem at once.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Everything that can go wrong while orchestrating distributed codegen.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// A temp file could not be created, written, renamed, read or removed.
    #[error("Can't {action} file {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An input module was rejected at registration.
    #[error("invalid input module '{id}': {message}")]
    InvalidInput { id: String, message: String },

    /// The whole-program summary analysis itself failed.
    #[error("thin link failed: {message}")]
    Analysis { message: String },

    /// The analysis named a module that was never registered.
    #[error("thin link assigned task {task} to module '{module}', which was never registered")]
    UnknownModule { module: String, task: usize },

    /// The host executable (anchor for backend lookup) is unknown.
    #[error("can't determine executable path: {message}")]
    ExecutableNotFound { message: String },

    /// No backend library could be located or loaded.
    #[error("Failed to open the plugin library for backend '{backend}': {reason}")]
    BackendNotFound { backend: String, reason: String },

    /// The backend library does not export the entry point.
    #[error("Failed to get address of the symbol: {symbol} in {}", .path.display())]
    EntryPointMissing { path: PathBuf, symbol: &'static str },

    /// A work item could not be expressed in the flat descriptor format.
    #[error("can't describe codegen work: {message}")]
    InvalidDescriptor { message: String },

    /// The backend returned a non-zero status.
    #[error("Failed to perform codegen with DTLTO plugin: {backend}, error code: {code}")]
    BackendCodegenFailed { backend: String, code: i32 },

    /// A unit selected for codegen has no object file after dispatch.
    #[error("no native object for module '{module}': {} does not exist", .path.display())]
    MissingOutput { module: String, path: PathBuf },

    /// Several independent failures.
    #[error("{0}")]
    Multiple(ErrorList),
}

impl CodegenError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Combine two errors, flattening nested lists.
    #[must_use]
    pub fn join(self, other: CodegenError) -> CodegenError {
        let mut list = ErrorList::default();
        list.push(self);
        list.push(other);
        CodegenError::Multiple(list)
    }

    /// `None` for no errors, the error itself for one, a list otherwise.
    pub fn combine(errors: impl IntoIterator<Item = CodegenError>) -> Option<CodegenError> {
        let mut list = ErrorList::default();
        for e in errors {
            list.push(e);
        }
        match list.0.len() {
            0 => None,
            1 => list.0.pop(),
            _ => Some(CodegenError::Multiple(list)),
        }
    }

    /// Every non-list error contained in `self`, in order.
    pub fn leaves(&self) -> Vec<&CodegenError> {
        match self {
            Self::Multiple(list) => list.iter().collect(),
            other => vec![other],
        }
    }
}

/// An ordered, flat list of errors.
#[derive(Debug, Default)]
pub struct ErrorList(Vec<CodegenError>);

impl ErrorList {
    fn push(&mut self, error: CodegenError) {
        match error {
            CodegenError::Multiple(list) => self.0.extend(list.0),
            other => self.0.push(other),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CodegenError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl IntoIterator for ErrorList {
    type Item = CodegenError;
    type IntoIter = std::vec::IntoIter<CodegenError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a CodegenError;
    type IntoIter = std::slice::Iter<'a, CodegenError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests;
