use std::{error::Error, fmt, path::PathBuf};

#[derive(Debug)]
pub enum FileSystemError {
    File {
        path: PathBuf,
        action: &'static str,
        source: std::io::Error,
    },

    Directory {
        path: PathBuf,
        action: &'static str,
        source: std::io::Error,
    },

    Symlink {
        from: PathBuf,
        target: PathBuf,
        source: std::io::Error,
    },

    NotADirectory {
        path: PathBuf,
    },
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSystemError::File {
                path,
                action,
                source,
            } => {
                write!(f, "Failed to {action} file `{}`: {source}", path.display())
            }
            FileSystemError::Directory {
                path,
                action,
                source,
            } => {
                write!(
                    f,
                    "Failed to {action} directory `{}`: {source}",
                    path.display()
                )
            }
            FileSystemError::Symlink {
                from,
                target,
                source,
            } => {
                write!(
                    f,
                    "Failed to link `{}` -> `{}`: {source}",
                    from.display(),
                    target.display()
                )
            }
            FileSystemError::NotADirectory { path } => {
                write!(f, "`{}` is not a directory", path.display())
            }
        }
    }
}

impl Error for FileSystemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FileSystemError::File { source, .. } => Some(source),
            FileSystemError::Directory { source, .. } => Some(source),
            FileSystemError::Symlink { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type FileSystemResult<T> = std::result::Result<T, FileSystemError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_file_system_error_display_and_source() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let file_error = FileSystemError::File {
            path: PathBuf::from("/file"),
            action: "remove",
            source: io_error,
        };
        assert_eq!(
            file_error.to_string(),
            "Failed to remove file `/file`: permission denied"
        );
        assert!(file_error.source().is_some());

        let io_error2 = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let dir_error = FileSystemError::Directory {
            path: PathBuf::from("/dir"),
            action: "read",
            source: io_error2,
        };
        assert_eq!(
            dir_error.to_string(),
            "Failed to read directory `/dir`: permission denied"
        );
        assert!(dir_error.source().is_some());

        let not_a_dir_error = FileSystemError::NotADirectory {
            path: PathBuf::from("/path"),
        };
        assert_eq!(not_a_dir_error.to_string(), "`/path` is not a directory");
        assert!(not_a_dir_error.source().is_none());
    }

    #[test]
    fn test_symlink_error_display() {
        let err = FileSystemError::Symlink {
            from: PathBuf::from("repo.db"),
            target: PathBuf::from("repo.db.tar.gz"),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "exists"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to link `repo.db` -> `repo.db.tar.gz`: exists"
        );
    }
}
