pub mod download;
pub mod error;
pub mod gitlab;
pub mod http;
pub mod http_client;
pub mod traits;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_server;
