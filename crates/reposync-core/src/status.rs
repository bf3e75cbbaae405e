use std::{fs, path::Path};

use reposync_config::{channel::Channel, settings::api_file_name};
use reposync_dl::traits::Platform;
use reposync_utils::fs::file_name;

use crate::{
    error::ErrorContext, reconcile::list_packages, DatabaseEntry, FileEntry, OptionalFile,
    RepoContext, RepoResult, StatusReport,
};

fn optional_file(path: &Path) -> OptionalFile {
    OptionalFile {
        path: path.to_path_buf(),
        size: fs::metadata(path).ok().map(|m| m.len()),
    }
}

/// Collects a read-only snapshot of the channel. Nothing is modified.
pub fn status<P: Platform>(ctx: &RepoContext<P>) -> RepoResult<StatusReport> {
    let settings = ctx.settings();
    let dir = &settings.repo_dir;
    let repo_dir_exists = dir.is_dir();

    let mut packages = Vec::new();
    let mut database = Vec::new();

    if repo_dir_exists {
        for path in list_packages(dir)? {
            let meta =
                fs::metadata(&path).with_context(|| format!("reading {}", path.display()))?;
            packages.push(FileEntry {
                name: file_name(&path),
                size: meta.len(),
            });
        }

        for name in settings.database_entries() {
            let path = dir.join(&name);
            let Ok(link_meta) = fs::symlink_metadata(&path) else {
                continue;
            };
            let link_target = if link_meta.file_type().is_symlink() {
                fs::read_link(&path).ok()
            } else {
                None
            };
            // a link reports the size of what it points at
            let size = fs::metadata(&path).map_or(link_meta.len(), |m| m.len());
            database.push(DatabaseEntry {
                name,
                size,
                link_target,
            });
        }
    }

    let api_files = Channel::ALL
        .iter()
        .map(|&channel| (channel, optional_file(&settings.api_dir.join(api_file_name(channel)))))
        .collect();

    Ok(StatusReport {
        channel: settings.channel,
        db_base_name: settings.db_base_name.clone(),
        repo_dir: dir.clone(),
        repo_dir_exists,
        api_dir: settings.api_dir.clone(),
        packages,
        database,
        api_files,
        sources_file: optional_file(&settings.sources_path),
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{database, test_utils::test_settings};

    #[test]
    fn test_status_reports_channel_contents() {
        let root = tempfile::tempdir().unwrap();
        let settings = test_settings(root.path(), Channel::Testing);
        let dir = settings.repo_dir.clone();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("a-1-1-any.pkg.tar.zst"), "aaaa").unwrap();
        fs::write(dir.join("b-1-1-any.pkg.tar.zst"), "bb").unwrap();
        database::rebuild(&settings).unwrap();
        fs::create_dir_all(&settings.api_dir).unwrap();
        fs::write(settings.api_dir.join("testing.json"), "[]").unwrap();

        let report = status(&RepoContext::new(settings)).unwrap();

        assert!(report.repo_dir_exists);
        assert_eq!(report.db_base_name, "core-testing");
        assert_eq!(
            report.packages,
            [
                FileEntry { name: "a-1-1-any.pkg.tar.zst".into(), size: 4 },
                FileEntry { name: "b-1-1-any.pkg.tar.zst".into(), size: 2 },
            ]
        );
        assert_eq!(report.total_package_size(), 6);

        let names: Vec<_> = report.database.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "core-testing.db",
                "core-testing.db.tar.gz",
                "core-testing.files",
                "core-testing.files.tar.gz"
            ]
        );
        assert_eq!(
            report.database[0].link_target,
            Some(PathBuf::from("core-testing.db.tar.gz"))
        );
        assert_eq!(report.database[0].size, report.database[1].size);
        assert!(report.database[1].link_target.is_none());

        let (stable, stable_file) = &report.api_files[0];
        assert_eq!(*stable, Channel::Stable);
        assert_eq!(stable_file.size, None);
        assert_eq!(report.api_files[1].1.size, Some(2));
        assert_eq!(report.sources_file.size, None);
    }

    #[test]
    fn test_status_without_repository() {
        let root = tempfile::tempdir().unwrap();
        let settings = test_settings(root.path(), Channel::Stable);
        let repo_dir = settings.repo_dir.clone();

        let report = status(&RepoContext::new(settings)).unwrap();

        assert!(!report.repo_dir_exists);
        assert!(report.packages.is_empty());
        assert!(report.database.is_empty());
        assert!(!repo_dir.exists());
    }
}
