use std::io;
use std::path::PathBuf;

/// Failures inside the local backend, reported through the host's
/// error callback.
#[derive(Debug, thiserror::Error)]
pub enum LocalError {
    #[error("Failed to find {name}: {message}")]
    CompilerNotFound { name: String, message: String },

    #[error("{compiler}: failed to start for '{module}': {source}")]
    Spawn {
        compiler: String,
        module: String,
        #[source]
        source: io::Error,
    },

    #[error("{compiler}: error: codegen of '{module}' failed ({}){}", exit_status(.status), stderr_suffix(.stderr))]
    Failed {
        compiler: String,
        module: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Error creating file '{}': {source}", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn exit_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}
