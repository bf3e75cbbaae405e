//! Stand-in packaging tools for tests.

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use reposync_config::{channel::Channel, settings::RepoSettings};

// Records the archives it was given in both database files.
const REPO_ADD: &str = r#"#!/bin/sh
db="$1"
shift
printf '%s\n' "$@" > "$db"
printf '%s\n' "$@" > "${db%.db.tar.gz}.files.tar.gz"
"#;

// Describes any archive whose name does not start with "broken".
const PACMAN: &str = r#"#!/bin/sh
file=$(basename "$2")
case "$file" in
    broken*) echo "error: could not load package '$file'" >&2; exit 1 ;;
esac
name=${file%%-[0-9]*}
printf 'Name            : %s\n' "$name"
printf 'Version         : 1.0-1\n'
printf 'Description     : Test package: %s\n' "$name"
printf 'Architecture    : x86_64\n'
printf 'URL             : https://example.com/%s\n' "$name"
printf 'Depends On      : glibc  zlib\n'
printf 'Build Date      : Mon 01 Jan 2024 00:00:00 UTC\n'
"#;

const FAILING: &str = "#!/bin/sh\necho 'tool failed' >&2\nexit 1\n";

fn tools_dir() -> &'static PathBuf {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = std::env::temp_dir().join(format!("reposync-test-tools-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for (name, body) in [("repo-add", REPO_ADD), ("pacman", PACMAN), ("failing", FAILING)] {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        dir
    })
}

fn tool(name: &str) -> String {
    tools_dir().join(name).to_string_lossy().into_owned()
}

pub fn fake_repo_add() -> String {
    tool("repo-add")
}

pub fn fake_pacman() -> String {
    tool("pacman")
}

pub fn failing_tool() -> String {
    tool("failing")
}

/// Settings rooted at `root` with the stand-in tools.
pub fn test_settings(root: &Path, channel: Channel) -> RepoSettings {
    let base = RepoSettings::new("core", "x86_64", channel);
    let repo_dir = root.join(&base.repo_dir);
    let mut settings = base
        .with_repo_dir(repo_dir)
        .with_api_dir(root.join("api"))
        .with_sources_path(root.join("packages.toml"));
    settings.repo_add_bin = fake_repo_add();
    settings.pacman_bin = fake_pacman();
    settings
}
