use miette::Diagnostic;
use reposync_utils::error::FileSystemError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(reposync_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(reposync_config::toml_deserialize),
        help("Check your packages.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(reposync_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Error while {action}")]
    #[diagnostic(
        code(reposync_config::io),
        help("Check file permissions and disk space")
    )]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(reposync_config::fs))]
    FileSystem(#[from] FileSystemError),

    #[error("Unknown channel: {0}")]
    #[diagnostic(
        code(reposync_config::unknown_channel),
        help("Valid channels are `stable` and `testing`")
    )]
    UnknownChannel(String),

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(reposync_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),

    #[error("Failed to annotate first table in array: {0}")]
    #[diagnostic(code(reposync_config::annotate_first_table))]
    AnnotateFirstTable(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
