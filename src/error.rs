//! Error types shared by the library modules.

use thiserror::Error;

/// Library error type. The binaries wrap it in `anyhow` at the top.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or unusable configuration (credential, client setup)
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error while reading or writing the stat file
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
