//! Rebuilds a channel's package database with `repo-add`.

use std::{fs::File, process::Command};

use reposync_config::settings::RepoSettings;
use reposync_utils::fs::{file_name, replace_symlink, safe_remove};
use tracing::{debug, info, warn};

use crate::{
    error::ErrorContext, reconcile::list_packages, tool, DatabaseState, RepoResult,
};

/// Deletes the versioned archives and the backups `repo-add` leaves behind.
///
/// The unversioned links are left alone; [`refresh_links`] replaces them.
pub fn remove_archives(settings: &RepoSettings) -> RepoResult<()> {
    let dir = &settings.repo_dir;
    let archives = [settings.db_archive_name(), settings.files_archive_name()];
    for name in archives.iter().chain(settings.stale_backup_entries().iter()) {
        safe_remove(dir.join(name))?;
    }
    Ok(())
}

/// Builds a fresh database from every archive in the channel directory.
///
/// The database is always rebuilt from scratch so it cannot drift from the
/// directory contents. An empty directory gets zero-length placeholder archives
/// so clients still find a database to fetch.
pub fn rebuild(settings: &RepoSettings) -> RepoResult<DatabaseState> {
    let dir = &settings.repo_dir;
    remove_archives(settings)?;

    let packages = list_packages(dir)?;
    let state = if packages.is_empty() {
        info!("No packages in {}, writing empty database", dir.display());
        for name in [settings.db_archive_name(), settings.files_archive_name()] {
            let path = dir.join(&name);
            File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        }
        DatabaseState::Empty
    } else {
        info!(
            "Building {} from {} package(s)",
            settings.db_archive_name(),
            packages.len()
        );
        let mut cmd = Command::new(&settings.repo_add_bin);
        cmd.current_dir(dir)
            .arg(settings.db_archive_name())
            .args(packages.iter().map(|path| file_name(path)));
        tool::run(&mut cmd, settings.show_tool_output)?;

        // repo-add may leave backups even on a fresh database
        for name in settings.stale_backup_entries() {
            safe_remove(dir.join(name))?;
        }
        DatabaseState::Indexed(packages.len())
    };

    refresh_links(settings);
    Ok(state)
}

/// Points `<db>.db` and `<db>.files` at the versioned archives.
///
/// A failed link leaves the previous one in place, so it is only logged.
pub fn refresh_links(settings: &RepoSettings) {
    let dir = &settings.repo_dir;
    let links = [
        (settings.db_archive_name(), settings.db_link_name()),
        (settings.files_archive_name(), settings.files_link_name()),
    ];

    for (target, link) in links {
        match replace_symlink(&target, dir.join(&link)) {
            Ok(()) => debug!("linked {link} -> {target}"),
            Err(err) => warn!("Could not link {link}: {err}"),
        }
    }
}

/// Removes every database entry of the channel, returning the names removed.
pub fn remove_database(settings: &RepoSettings) -> Vec<String> {
    let dir = &settings.repo_dir;
    let entries = settings
        .database_entries()
        .into_iter()
        .chain(settings.stale_backup_entries());

    let mut removed = Vec::new();
    for name in entries {
        let path = dir.join(&name);
        if path.symlink_metadata().is_err() {
            continue;
        }
        match safe_remove(&path) {
            Ok(()) => removed.push(name),
            Err(err) => warn!("Could not remove {name}: {err}"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use std::fs;

    use reposync_config::channel::Channel;

    use super::*;
    use crate::{error::RepoError, test_utils::{failing_tool, fake_repo_add}};

    fn settings(dir: &std::path::Path) -> RepoSettings {
        let mut settings = RepoSettings::new("core", "x86_64", Channel::Testing)
            .with_repo_dir(dir)
            .with_api_dir(dir.join("api"));
        settings.repo_add_bin = fake_repo_add();
        settings
    }

    #[test]
    fn test_empty_directory_gets_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());

        assert_eq!(rebuild(&settings).unwrap(), DatabaseState::Empty);

        for name in ["core-testing.db.tar.gz", "core-testing.files.tar.gz"] {
            assert_eq!(fs::metadata(dir.path().join(name)).unwrap().len(), 0);
        }
        assert_eq!(
            fs::read_link(dir.path().join("core-testing.db")).unwrap(),
            std::path::PathBuf::from("core-testing.db.tar.gz")
        );
        assert_eq!(
            fs::read_link(dir.path().join("core-testing.files")).unwrap(),
            std::path::PathBuf::from("core-testing.files.tar.gz")
        );
    }

    #[test]
    fn test_rebuild_indexes_all_packages_from_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        fs::write(dir.path().join("b-1-1-any.pkg.tar.zst"), "b").unwrap();
        fs::write(dir.path().join("a-1-1-any.pkg.tar.zst"), "a").unwrap();
        fs::write(dir.path().join("core-testing.db.tar.gz"), "stale-entry\n").unwrap();
        fs::write(dir.path().join("core-testing.db.tar.gz.old"), "backup").unwrap();

        assert_eq!(rebuild(&settings).unwrap(), DatabaseState::Indexed(2));

        let db = fs::read_to_string(dir.path().join("core-testing.db")).unwrap();
        assert_eq!(db, "a-1-1-any.pkg.tar.zst\nb-1-1-any.pkg.tar.zst\n");
        assert!(dir.path().join("core-testing.files.tar.gz").exists());
        assert!(!dir.path().join("core-testing.db.tar.gz.old").exists());
    }

    #[test]
    fn test_repo_add_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.repo_add_bin = failing_tool();
        fs::write(dir.path().join("a-1-1-any.pkg.tar.zst"), "a").unwrap();

        let err = rebuild(&settings).unwrap_err();
        assert!(matches!(err, RepoError::ToolFailed { .. }));
    }

    #[test]
    fn test_remove_database() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        rebuild(&settings).unwrap();

        let mut removed = remove_database(&settings);
        removed.sort();
        assert_eq!(
            removed,
            [
                "core-testing.db",
                "core-testing.db.tar.gz",
                "core-testing.files",
                "core-testing.files.tar.gz"
            ]
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
