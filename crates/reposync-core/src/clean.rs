use reposync_dl::traits::Platform;
use reposync_utils::fs::{file_name, safe_remove};
use tracing::info;

use crate::{database, metadata, reconcile::list_packages, CleanReport, RepoContext, RepoResult};

/// Removes every package and database entry of the channel and resets its
/// metadata file to an empty list.
pub fn clean<P: Platform>(ctx: &RepoContext<P>) -> RepoResult<CleanReport> {
    let settings = ctx.settings();
    let dir = &settings.repo_dir;

    let mut report = CleanReport::default();
    if dir.exists() {
        for path in list_packages(dir)? {
            safe_remove(&path)?;
            report.removed_packages.push(file_name(&path));
        }
        report.removed_database = database::remove_database(settings);
    } else {
        info!("{} does not exist, no packages to remove", dir.display());
    }

    report.api_file = settings.api_file_path();
    metadata::write_records(&report.api_file, &[])?;

    info!(
        "Removed {} package(s) and {} database entries from {}",
        report.removed_packages.len(),
        report.removed_database.len(),
        dir.display()
    );
    Ok(report)
}
