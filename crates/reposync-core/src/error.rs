//! Error types for reposync-core.

use miette::Diagnostic;
use reposync_config::error::ConfigError;
use reposync_dl::error::DownloadError;
use reposync_utils::error::FileSystemError;
use thiserror::Error;

/// Failures that abort a run.
///
/// Recoverable problems (one project's releases, one download, one package's
/// metadata, one symlink) are logged where they happen and never surface here.
#[derive(Error, Diagnostic, Debug)]
pub enum RepoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(
        code(reposync::fs),
        help("Check that the repository directories exist and are writable")
    )]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] DownloadError),

    #[error("Error while {action}")]
    #[diagnostic(code(reposync::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run `{tool}`")]
    #[diagnostic(
        code(reposync::tool_spawn),
        help("Make sure the tool is installed and on PATH, or point to it explicitly")
    )]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{tool}` exited with {status}{}", format_stderr(.stderr))]
    #[diagnostic(code(reposync::tool_failed))]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Unrecognised package information for {0}")]
    #[diagnostic(
        code(reposync::package_info),
        help("The file may not be a valid package archive")
    )]
    InvalidPackageInfo(String),

    #[error(transparent)]
    #[diagnostic(code(reposync::json))]
    Json(#[from] serde_json::Error),
}

fn format_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, RepoError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, RepoError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            RepoError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
