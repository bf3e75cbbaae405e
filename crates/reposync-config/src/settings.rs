use std::path::{Path, PathBuf};

use crate::{channel::Channel, sources::DEFAULT_SOURCES_FILE};

pub const DEFAULT_REPO_NAME: &str = "repo";
pub const DEFAULT_ARCH: &str = "x86_64";
pub const DEFAULT_API_DIR: &str = "api";
pub const DEFAULT_FORGE_URL: &str = "https://gitlab.com";
pub const DEFAULT_REPO_ADD: &str = "repo-add";
pub const DEFAULT_PACMAN: &str = "pacman";

/// Runtime settings for one invocation, resolved for exactly one channel.
#[derive(Debug, Clone)]
pub struct RepoSettings {
    pub repo_name: String,
    pub arch: String,
    pub channel: Channel,
    /// Database base name; `<repo>` for stable, `<repo>-testing` for testing.
    pub db_base_name: String,
    /// Directory holding the channel's package archives and database.
    pub repo_dir: PathBuf,
    /// Directory receiving `<channel>.json`.
    pub api_dir: PathBuf,
    pub sources_path: PathBuf,
    pub forge_url: String,
    pub forge_token: Option<String>,
    /// Fallback id for forge projects declared without one.
    pub ci_project_id: Option<String>,
    pub repo_add_bin: String,
    pub pacman_bin: String,
    /// Pass external tool output through instead of capturing it.
    pub show_tool_output: bool,
}

impl RepoSettings {
    /// Builds settings with the channel-derived layout and default tools.
    pub fn new(repo_name: impl Into<String>, arch: impl Into<String>, channel: Channel) -> Self {
        let repo_name = repo_name.into();
        let arch = arch.into();

        let (db_base_name, repo_dir) = match channel {
            Channel::Stable => (repo_name.clone(), PathBuf::from(&arch)),
            Channel::Testing => {
                (
                    format!("{repo_name}-testing"),
                    Path::new("testing").join(&arch),
                )
            }
        };

        Self {
            repo_name,
            arch,
            channel,
            db_base_name,
            repo_dir,
            api_dir: PathBuf::from(DEFAULT_API_DIR),
            sources_path: PathBuf::from(DEFAULT_SOURCES_FILE),
            forge_url: DEFAULT_FORGE_URL.to_string(),
            forge_token: None,
            ci_project_id: None,
            repo_add_bin: DEFAULT_REPO_ADD.to_string(),
            pacman_bin: DEFAULT_PACMAN.to_string(),
            show_tool_output: false,
        }
    }

    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = dir.into();
        self
    }

    pub fn with_api_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.api_dir = dir.into();
        self
    }

    pub fn with_sources_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources_path = path.into();
        self
    }

    /// Versioned package database archive, e.g. `repo.db.tar.gz`.
    pub fn db_archive_name(&self) -> String {
        format!("{}.db.tar.gz", self.db_base_name)
    }

    /// Versioned file list archive, e.g. `repo.files.tar.gz`.
    pub fn files_archive_name(&self) -> String {
        format!("{}.files.tar.gz", self.db_base_name)
    }

    /// Stable symlink name pointing at [`Self::db_archive_name`].
    pub fn db_link_name(&self) -> String {
        format!("{}.db", self.db_base_name)
    }

    /// Stable symlink name pointing at [`Self::files_archive_name`].
    pub fn files_link_name(&self) -> String {
        format!("{}.files", self.db_base_name)
    }

    /// Database entries in display order: link then archive, db then files.
    pub fn database_entries(&self) -> [String; 4] {
        [
            self.db_link_name(),
            self.db_archive_name(),
            self.files_link_name(),
            self.files_archive_name(),
        ]
    }

    /// Backups `repo-add` leaves next to an archive it replaced.
    pub fn stale_backup_entries(&self) -> [String; 2] {
        [
            format!("{}.old", self.db_archive_name()),
            format!("{}.old", self.files_archive_name()),
        ]
    }

    pub fn api_file_name(&self) -> String {
        api_file_name(self.channel)
    }

    pub fn api_file_path(&self) -> PathBuf {
        self.api_dir.join(self.api_file_name())
    }
}

/// Metadata file name for a channel, e.g. `stable.json`.
pub fn api_file_name(channel: Channel) -> String {
    format!("{channel}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_layout() {
        let settings = RepoSettings::new("core", "aarch64", Channel::Stable);
        assert_eq!(settings.db_base_name, "core");
        assert_eq!(settings.repo_dir, PathBuf::from("aarch64"));
        assert_eq!(settings.db_archive_name(), "core.db.tar.gz");
        assert_eq!(settings.files_link_name(), "core.files");
        assert_eq!(settings.api_file_path(), PathBuf::from("api/stable.json"));
    }

    #[test]
    fn test_testing_layout() {
        let settings = RepoSettings::new("core", "x86_64", Channel::Testing);
        assert_eq!(settings.db_base_name, "core-testing");
        assert_eq!(settings.repo_dir, PathBuf::from("testing/x86_64"));
        assert_eq!(
            settings.database_entries(),
            [
                "core-testing.db".to_string(),
                "core-testing.db.tar.gz".to_string(),
                "core-testing.files".to_string(),
                "core-testing.files.tar.gz".to_string(),
            ]
        );
        assert_eq!(settings.api_file_name(), "testing.json");
    }

    #[test]
    fn test_overrides() {
        let settings = RepoSettings::new("core", "x86_64", Channel::Testing)
            .with_repo_dir("/srv/repo/testing")
            .with_api_dir("/srv/api");
        assert_eq!(settings.repo_dir, PathBuf::from("/srv/repo/testing"));
        assert_eq!(
            settings.api_file_path(),
            PathBuf::from("/srv/api/testing.json")
        );
        assert_eq!(settings.db_base_name, "core-testing");
    }
}
