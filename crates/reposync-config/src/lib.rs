pub mod annotations;
pub mod channel;
pub mod error;
pub mod settings;
pub mod sources;

/// File name suffix of a distribution package archive.
pub const PKG_EXTENSION: &str = ".pkg.tar.zst";
