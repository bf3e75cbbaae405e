//! Declarative package source configuration.
//!
//! The sources file lists forge projects whose releases are mirrored and direct
//! download URLs, each targeting one or more channels.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use documented::{Documented, DocumentedFields};
use reposync_utils::fs::ensure_dir_exists;
use serde::{Deserialize, Deserializer, Serialize};
use toml_edit::{DocumentMut, Item};
use tracing::{info, warn};

use crate::{
    annotations::{annotate_toml_array_of_tables, annotate_toml_table},
    channel::Channel,
    error::{ConfigError, Result},
};

/// Default file name of the sources configuration.
pub const DEFAULT_SOURCES_FILE: &str = "packages.toml";

/// Package sources mirrored into the repository.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct SourcesConfig {
    /// Forge projects whose release assets are mirrored.
    /// A project listed for both channels publishes its newest release to testing
    /// and the release before it to stable.
    #[serde(default)]
    pub forge_projects: Vec<ForgeProject>,

    /// Single package archives downloaded from a fixed URL.
    /// A URL entry overrides a forge asset with the same file name.
    #[serde(default)]
    pub remote_urls: Vec<DirectSource>,
}

/// A forge project whose releases provide package archives.
#[derive(Clone, Debug, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct ForgeProject {
    /// Numeric project id or URL-encoded path on the forge.
    /// Leave empty to use the CI project id of the running pipeline.
    #[serde(default)]
    pub id: String,

    /// Human readable name used in logs.
    #[serde(default)]
    pub name: String,

    /// Channels this project publishes to: "stable", "testing" or both.
    #[serde(default, deserialize_with = "deserialize_channels")]
    pub channels: BTreeSet<Channel>,

    /// Whether this project is mirrored at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A package archive downloaded from a direct URL.
#[derive(Clone, Debug, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct DirectSource {
    /// Download URL; must end with the package archive suffix.
    pub url: String,

    /// Channel this package belongs to: "stable" or "testing".
    pub channel: String,

    /// Whether this URL is mirrored at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ForgeProject {
    pub fn is_dual_channel(&self) -> bool {
        Channel::ALL.iter().all(|c| self.channels.contains(c))
    }

    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ChannelList {
    Many(Vec<String>),
    Joined(String),
}

/// Accepts either a list of channel names or a single `;` separated string.
/// Unknown names are skipped with a warning so one typo does not invalidate the file.
fn deserialize_channels<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<Channel>, D::Error>
where
    D: Deserializer<'de>,
{
    let names = match ChannelList::deserialize(deserializer)? {
        ChannelList::Many(names) => names,
        ChannelList::Joined(joined) => joined.split(';').map(String::from).collect(),
    };

    Ok(names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            name.parse::<Channel>()
                .inspect_err(|err| warn!("Ignoring channel entry: {err}"))
                .ok()
        })
        .collect())
}

/// Outcome of reading the sources file.
#[derive(Debug)]
pub enum LoadedSources {
    /// The file existed and was parsed.
    Loaded(SourcesConfig),
    /// The file was missing; a template was written at the given path.
    TemplateCreated(PathBuf),
}

impl SourcesConfig {
    /// Parse a sources configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the sources file, writing a template when it does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<LoadedSources> {
        if !path.exists() {
            Self::write_template(path)?;
            return Ok(LoadedSources::TemplateCreated(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|err| {
            ConfigError::IoError {
                action: format!("reading {}", path.display()),
                source: err,
            }
        })?;
        Ok(LoadedSources::Loaded(Self::from_toml(&content)?))
    }

    /// A configuration with one example entry of each kind.
    pub fn template() -> Self {
        Self {
            forge_projects: vec![ForgeProject {
                id: "12345".to_string(),
                name: "example-package".to_string(),
                channels: BTreeSet::from([Channel::Stable]),
                enabled: true,
            }],
            remote_urls: vec![DirectSource {
                url: "https://example.com/package.pkg.tar.zst".to_string(),
                channel: Channel::Stable.to_string(),
                enabled: true,
            }],
        }
    }

    /// Convert config to an annotated TOML document with field documentation.
    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        let header = r#"# Repository package sources
# Edit the entries below, then run the sync again.
#
# Forge projects publish their release assets; direct URLs publish one file each.
# Only archives ending in .pkg.tar.zst are mirrored.

"#;
        doc.as_table_mut().decor_mut().set_prefix(header);

        annotate_toml_table::<SourcesConfig>(doc.as_table_mut(), true)?;

        if let Some(Item::ArrayOfTables(projects)) = doc.get_mut("forge_projects") {
            annotate_toml_array_of_tables::<ForgeProject>(projects)?;
        }
        if let Some(Item::ArrayOfTables(urls)) = doc.get_mut("remote_urls") {
            annotate_toml_array_of_tables::<DirectSource>(urls)?;
        }

        Ok(doc)
    }

    /// Write the annotated template to `path`. Never overwrites an existing file.
    pub fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir_exists(parent)?;
        }

        let doc = Self::template().to_annotated_document()?;
        fs::write(path, doc.to_string()).map_err(|err| {
            ConfigError::IoError {
                action: format!("writing {}", path.display()),
                source: err,
            }
        })?;

        info!("Created default sources file: {}", path.display());
        Ok(())
    }
}
