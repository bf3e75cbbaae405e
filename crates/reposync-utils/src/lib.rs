pub mod bytes;
pub mod error;
pub mod fs;
