use std::path::PathBuf;

use reposync_config::channel::Channel;

// ---- Resolution ----

/// Where a resolved package was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Forge,
    Direct,
}

/// A package archive accepted for the active channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    /// Archive file name, the identity key within a channel.
    pub filename: String,
    pub url: String,
    pub channel: Channel,
    pub kind: SourceKind,
}

/// Why a candidate source was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Disabled,
    /// Declared for the channel that is not being synced.
    OtherChannel,
    UnknownChannel(String),
    /// Name or URL does not end with the package archive suffix.
    NotPackageArchive,
    /// URL does not use https.
    InsecureUrl,
    /// No file name could be derived from the URL.
    NoFilename,
}

impl RejectReason {
    /// Rejections that point at a configuration mistake rather than routine filtering.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            Self::UnknownChannel(_)
                | Self::NotPackageArchive
                | Self::InsecureUrl
                | Self::NoFilename
        )
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::OtherChannel => write!(f, "belongs to another channel"),
            Self::UnknownChannel(name) => write!(f, "unknown channel '{name}'"),
            Self::NotPackageArchive => write!(f, "not a package archive"),
            Self::InsecureUrl => write!(f, "not served over https"),
            Self::NoFilename => write!(f, "no file name in URL"),
        }
    }
}

/// Result of examining one candidate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Accepted(ResolvedPackage),
    Rejected { source: String, reason: RejectReason },
}

// ---- Reconcile ----

/// A download that failed; the run continued without it.
#[derive(Debug, Clone)]
pub struct FailedDownload {
    pub filename: String,
    pub url: String,
    pub error: String,
}

/// What reconciliation changed in the channel directory.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub removed: Vec<String>,
    pub downloaded: Vec<String>,
    /// Desired files that were already present and left untouched.
    pub kept: Vec<String>,
    pub failed: Vec<FailedDownload>,
}

// ---- Database ----

/// State of the channel database after a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseState {
    /// `repo-add` indexed this many archives.
    Indexed(usize),
    /// No archives were present; placeholders were written.
    Empty,
}

// ---- Sync ----

/// Report returned after a full sync.
#[derive(Debug)]
pub struct SyncReport {
    pub channel: Channel,
    /// Size of the desired set after merging all sources.
    pub desired: usize,
    pub reconcile: ReconcileReport,
    pub database: DatabaseState,
    /// Number of records written to the metadata file.
    pub records: usize,
    pub api_file: PathBuf,
}

/// Outcome of a sync invocation.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The sources file was missing; a template was written and nothing else ran.
    TemplateCreated(PathBuf),
    Synced(SyncReport),
}

// ---- Clean ----

/// Report returned after cleaning a channel.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub removed_packages: Vec<String>,
    pub removed_database: Vec<String>,
    /// Metadata file reset to an empty list.
    pub api_file: PathBuf,
}

// ---- Status ----

/// A file present on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
}

/// A database entry that exists in the channel directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEntry {
    pub name: String,
    pub size: u64,
    /// Target when the entry is a symbolic link.
    pub link_target: Option<PathBuf>,
}

/// A file that may or may not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalFile {
    pub path: PathBuf,
    pub size: Option<u64>,
}

/// Read-only snapshot of a channel.
#[derive(Debug)]
pub struct StatusReport {
    pub channel: Channel,
    pub db_base_name: String,
    pub repo_dir: PathBuf,
    pub repo_dir_exists: bool,
    pub api_dir: PathBuf,
    pub packages: Vec<FileEntry>,
    pub database: Vec<DatabaseEntry>,
    /// Metadata files for every channel.
    pub api_files: Vec<(Channel, OptionalFile)>,
    pub sources_file: OptionalFile,
}

impl StatusReport {
    pub fn total_package_size(&self) -> u64 {
        self.packages.iter().map(|p| p.size).sum()
    }
}
