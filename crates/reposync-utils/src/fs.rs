use std::{
    fs,
    io::ErrorKind,
    os::unix::fs::symlink,
    path::{Path, PathBuf},
};

use crate::error::{FileSystemError, FileSystemResult};

pub trait FileSystemProvider {
    /// Removes the specified file, symlink or directory safely.
    ///
    /// If the path does not exist, this function returns `Ok(())` without error. Symlinks are
    /// removed themselves, never followed, so a dangling link is still cleaned up. If the path
    /// points to a directory, it and all of its contents are removed recursively.
    ///
    /// # Errors
    ///
    /// Returns a [`FileSystemError::File`] if the removal fails for any reason other than
    /// the path not existing (e.g., permission denied).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use reposync_utils::error::FileSystemResult;
    /// use reposync_utils::fs::{FileSystemProvider, StandardFileSystemProvider};
    ///
    /// fn main() -> FileSystemResult<()> {
    ///     let fs = StandardFileSystemProvider;
    ///     fs.safe_remove("/tmp/some_path")?;
    ///     Ok(())
    /// }
    /// ```
    fn safe_remove<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()>;

    /// Creates a directory structure if it doesn't exist.
    ///
    /// # Errors
    ///
    /// * [`FileSystemError::Directory`] if the directory could not be created.
    /// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
    fn ensure_dir_exists<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()>;

    /// Lists regular entries of `dir` whose file name ends with `suffix`.
    ///
    /// Directories are skipped. The result is sorted by file name so callers see a
    /// stable encounter order.
    ///
    /// # Errors
    ///
    /// * [`FileSystemError::Directory`] if the directory could not be read.
    fn list_files_with_suffix<P: AsRef<Path>>(
        &self,
        dir: P,
        suffix: &str,
    ) -> FileSystemResult<Vec<PathBuf>>;

    /// Points `link` at `target`, replacing whatever `link` was before.
    ///
    /// `target` is stored verbatim, so relative targets resolve against the link's directory.
    fn replace_symlink<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        target: P,
        link: Q,
    ) -> FileSystemResult<()>;
}

#[derive(Default, Clone)]
pub struct StandardFileSystemProvider;

impl FileSystemProvider for StandardFileSystemProvider {
    fn safe_remove<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()> {
        let path = path.as_ref();

        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(FileSystemError::File {
                    path: path.to_path_buf(),
                    action: "inspect",
                    source: err,
                })
            }
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        result.map_err(|err| {
            FileSystemError::File {
                path: path.to_path_buf(),
                action: "remove",
                source: err,
            }
        })
    }

    fn ensure_dir_exists<P: AsRef<Path>>(&self, path: P) -> FileSystemResult<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).map_err(|err| {
                FileSystemError::Directory {
                    path: path.to_path_buf(),
                    action: "create",
                    source: err,
                }
            })?;
        } else if !path.is_dir() {
            return Err(FileSystemError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        Ok(())
    }

    fn list_files_with_suffix<P: AsRef<Path>>(
        &self,
        dir: P,
        suffix: &str,
    ) -> FileSystemResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let read_err = |err| {
            FileSystemError::Directory {
                path: dir.to_path_buf(),
                action: "read",
                source: err,
            }
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            let file_type = entry.file_type().map_err(read_err)?;
            if file_type.is_dir() {
                continue;
            }

            let name = entry.file_name();
            if name.to_string_lossy().ends_with(suffix) {
                files.push(entry.path());
            }
        }

        files.sort();
        Ok(files)
    }

    fn replace_symlink<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        target: P,
        link: Q,
    ) -> FileSystemResult<()> {
        let target = target.as_ref();
        let link = link.as_ref();

        self.safe_remove(link)?;
        symlink(target, link).map_err(|err| {
            FileSystemError::Symlink {
                from: link.to_path_buf(),
                target: target.to_path_buf(),
                source: err,
            }
        })
    }
}

/// Creates a directory structure if it doesn't exist.
///
/// See [`FileSystemProvider::ensure_dir_exists`] for detailed documentation.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    StandardFileSystemProvider.ensure_dir_exists(path)
}

/// Removes the specified file, symlink or directory safely.
///
/// See [`FileSystemProvider::safe_remove`] for detailed documentation.
pub fn safe_remove<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    StandardFileSystemProvider.safe_remove(path)
}

/// Lists files in `dir` ending with `suffix`, sorted by name.
///
/// See [`FileSystemProvider::list_files_with_suffix`] for detailed documentation.
pub fn list_files_with_suffix<P: AsRef<Path>>(
    dir: P,
    suffix: &str,
) -> FileSystemResult<Vec<PathBuf>> {
    StandardFileSystemProvider.list_files_with_suffix(dir, suffix)
}

/// Replaces `link` with a symlink pointing at `target`.
///
/// See [`FileSystemProvider::replace_symlink`] for detailed documentation.
pub fn replace_symlink<P: AsRef<Path>, Q: AsRef<Path>>(target: P, link: Q) -> FileSystemResult<()> {
    StandardFileSystemProvider.replace_symlink(target, link)
}

/// Returns the file name component of `path` as an owned string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
