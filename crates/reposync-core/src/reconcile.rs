//! Brings a channel directory in line with the desired set.

use std::{
    fs,
    path::{Path, PathBuf},
};

use reposync_config::PKG_EXTENSION;
use reposync_dl::download::Download;
use reposync_utils::fs::{file_name, list_files_with_suffix, safe_remove};
use tracing::{debug, error, info, warn};

use crate::{merge::DesiredSet, FailedDownload, ReconcileReport, RepoResult};

/// Package archives currently in `dir`, sorted by name.
pub fn list_packages(dir: &Path) -> RepoResult<Vec<PathBuf>> {
    Ok(list_files_with_suffix(dir, PKG_EXTENSION)?)
}

/// Deletes orphans, then downloads what is missing.
///
/// Files already present are never fetched again. A failed deletion aborts the
/// run; a failed download is recorded and the remaining packages still proceed.
pub fn reconcile(dir: &Path, desired: &DesiredSet) -> RepoResult<ReconcileReport> {
    let mut report = ReconcileReport::default();

    for path in list_packages(dir)? {
        let name = file_name(&path);
        if desired.contains(&name) {
            if path.exists() {
                report.kept.push(name);
            } else {
                warn!("Replacing dangling link {name}");
                safe_remove(&path)?;
            }
            continue;
        }
        info!("Removing {name}");
        safe_remove(&path)?;
        report.removed.push(name);
    }

    for package in desired.iter() {
        let target = dir.join(&package.filename);
        if fs::symlink_metadata(&target).is_ok() {
            continue;
        }

        info!("Downloading {}", package.filename);
        match Download::new(&package.url, &target).execute() {
            Ok(_) => report.downloaded.push(package.filename.clone()),
            Err(err) => {
                error!("Failed to download {}: {err}", package.filename);
                report.failed.push(FailedDownload {
                    filename: package.filename.clone(),
                    url: package.url.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    debug!(
        "reconciled {}: {} kept, {} removed, {} downloaded, {} failed",
        dir.display(),
        report.kept.len(),
        report.removed.len(),
        report.downloaded.len(),
        report.failed.len()
    );
    Ok(report)
}
