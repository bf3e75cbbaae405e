use error::RepoError;

pub mod clean;
pub mod context;
pub mod database;
pub mod error;
pub mod merge;
pub mod metadata;
pub mod reconcile;
pub mod release;
pub mod source;
pub mod status;
pub mod sync;
pub mod tool;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

pub use context::RepoContext;
pub use types::*;

pub type RepoResult<T> = std::result::Result<T, RepoError>;
