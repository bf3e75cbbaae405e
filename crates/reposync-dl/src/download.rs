use std::{
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use tracing::trace;

use crate::{error::DownloadError, http::Http};

/// A single-file HTTP download.
pub struct Download {
    pub url: String,
    pub output: PathBuf,
}

impl Download {
    /// Creates a new `Download` of `url` into `output`.
    ///
    /// # Examples
    ///
    /// ```
    /// use reposync_dl::download::Download;
    ///
    /// let dl = Download::new(
    ///     "https://example.com/foo.pkg.tar.zst",
    ///     "x86_64/foo.pkg.tar.zst",
    /// );
    /// ```
    pub fn new(url: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            output: output.into(),
        }
    }

    /// Performs the download and returns the path that was written.
    ///
    /// Parent directories are created as needed. On any failure, including a non-2xx
    /// status, the partially written file is removed before the error is returned, so
    /// the target path either holds a complete body or does not exist.
    pub fn execute(self) -> Result<PathBuf, DownloadError> {
        let output_path = self.output.clone();

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if let Err(err) = self.download_to_file(&output_path) {
            if let Err(rm_err) = fs::remove_file(&output_path) {
                if rm_err.kind() != std::io::ErrorKind::NotFound {
                    trace!(
                        "could not remove partial file {}: {rm_err}",
                        output_path.display()
                    );
                }
            }
            return Err(err);
        }

        Ok(output_path)
    }

    fn download_to_file(&self, path: &Path) -> Result<u64, DownloadError> {
        let resp = Http::fetch(&self.url)?;

        let mut reader = resp.into_body().into_reader();
        let mut writer = BufWriter::new(File::create(path)?);
        let written = std::io::copy(&mut reader, &mut writer)?;
        writer.flush()?;

        trace!("wrote {written} bytes to {}", path.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{TestResponse, TestServer};

    #[test]
    fn test_download_writes_body() {
        let server = TestServer::start(vec![(
            "/pool/foo.pkg.tar.zst",
            TestResponse::ok("package-bytes"),
        )]);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("foo.pkg.tar.zst");

        let path = Download::new(server.url("/pool/foo.pkg.tar.zst"), &target)
            .execute()
            .unwrap();

        assert_eq!(path, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "package-bytes");
    }

    #[test]
    fn test_download_not_found_leaves_no_file() {
        let server = TestServer::start(vec![]);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing.pkg.tar.zst");

        let err = Download::new(server.url("/missing.pkg.tar.zst"), &target)
            .execute()
            .unwrap_err();

        assert!(matches!(err, DownloadError::HttpError { status: 404, .. }));
        assert!(!target.exists());
    }

    #[test]
    fn test_download_connection_refused_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("foo.pkg.tar.zst");

        let url = {
            let server = TestServer::start(vec![]);
            server.url("/foo.pkg.tar.zst")
        };

        let err = Download::new(url, &target).execute().unwrap_err();
        assert!(matches!(err, DownloadError::Network(_)));
        assert!(!target.exists());
    }
}
