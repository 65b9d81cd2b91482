//! Data acquisition for the dashboard: the profile API client, the shared
//! dataset cache, and the world atlas geometry.

pub mod atlas;
pub mod cache;
pub mod client;
pub mod config;

use thiserror::Error;

// Re-exports
pub use atlas::{CountryShape, WorldAtlas};
pub use cache::DatasetCache;
pub use client::{ProfileApiClient, RowFetcher};
pub use config::ApiConfig;

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("atlas error: {0}")]
    Atlas(String),
}

impl From<reqwest::Error> for DataError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            DataError::Status(status.as_u16())
        } else if error.is_decode() {
            DataError::Decode(error.to_string())
        } else {
            DataError::Http(error.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(error: serde_json::Error) -> Self {
        DataError::Decode(error.to_string())
    }
}
