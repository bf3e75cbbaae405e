//! Per-package metadata exported as `<api>/<channel>.json`.

use std::{fs, path::Path, process::Command};

use chrono::{DateTime, Local};
use reposync_config::{channel::Channel, settings::RepoSettings};
use reposync_utils::fs::{ensure_dir_exists, file_name};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{error::{ErrorContext, RepoError}, reconcile::list_packages, tool, RepoResult};

/// Value used for fields the package does not declare.
pub const MISSING_FIELD: &str = "None";

const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One entry of the exported metadata list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub description: String,
    pub architecture: String,
    pub filename: String,
    /// Archive size in bytes, as a decimal string.
    pub size: String,
    /// Local modification time, `YYYY-MM-DD HH:MM:SS`.
    pub modified: String,
    pub depends: String,
    pub groups: String,
    pub channel: Channel,
}

/// Fields read from the package tool's info listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub architecture: String,
    pub depends: String,
    pub groups: String,
}

impl Default for PackageInfo {
    fn default() -> Self {
        let missing = || MISSING_FIELD.to_string();
        Self {
            name: missing(),
            version: missing(),
            description: missing(),
            architecture: missing(),
            depends: missing(),
            groups: missing(),
        }
    }
}

/// Parses `Key : value` lines as printed by `pacman -Qip`.
///
/// Only the first colon separates key from value, so descriptions containing
/// colons survive. Unknown keys are ignored. Returns `None` when no package
/// name is present.
pub fn parse_package_info(output: &str) -> Option<PackageInfo> {
    let mut info = PackageInfo::default();
    let mut has_name = false;

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "Name" => {
                has_name = !value.is_empty();
                info.name = value;
            }
            "Version" => info.version = value,
            "Description" => info.description = value,
            "Architecture" => info.architecture = value,
            "Depends On" => info.depends = value,
            "Groups" => info.groups = value,
            _ => {}
        }
    }

    has_name.then_some(info)
}

/// Builds the record for one archive.
pub fn inspect_package(settings: &RepoSettings, path: &Path) -> RepoResult<PackageRecord> {
    let filename = file_name(path);
    let output = tool::capture(
        Command::new(&settings.pacman_bin)
            .env("LC_ALL", "C")
            .arg("-Qip")
            .arg(path),
    )?;
    let info = parse_package_info(&output).ok_or_else(|| RepoError::InvalidPackageInfo(filename.clone()))?;

    let meta = fs::metadata(path).with_context(|| format!("reading metadata of {}", path.display()))?;
    let modified = meta
        .modified()
        .with_context(|| format!("reading modification time of {}", path.display()))?;

    Ok(PackageRecord {
        name: info.name,
        version: info.version,
        description: info.description,
        architecture: info.architecture,
        filename,
        size: meta.len().to_string(),
        modified: DateTime::<Local>::from(modified)
            .format(MODIFIED_FORMAT)
            .to_string(),
        depends: info.depends,
        groups: info.groups,
        channel: settings.channel,
    })
}

/// Inspects every archive in the channel directory, skipping ones that fail.
pub fn collect_records(settings: &RepoSettings) -> RepoResult<Vec<PackageRecord>> {
    let mut records = Vec::new();
    for path in list_packages(&settings.repo_dir)? {
        match inspect_package(settings, &path) {
            Ok(record) => records.push(record),
            Err(err) => warn!("Skipping metadata for {}: {err}", file_name(&path)),
        }
    }
    Ok(records)
}

/// Writes records as an indented JSON array, replacing the file.
pub fn write_records(path: &Path, records: &[PackageRecord]) -> RepoResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    debug!("wrote {} record(s) to {}", records.len(), path.display());
    Ok(())
}

/// Regenerates the channel's metadata file and returns the record count.
pub fn generate(settings: &RepoSettings) -> RepoResult<usize> {
    let records = collect_records(settings)?;
    let path = settings.api_file_path();
    write_records(&path, &records)?;
    info!("Wrote metadata for {} package(s) to {}", records.len(), path.display());
    Ok(records.len())
}
