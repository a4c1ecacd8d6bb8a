// src/error.rs
//! Error type shared by every library operation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A file system operation failed on `path`.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The store text could not be decoded. Positions are 1-based.
    #[error("store decode failed at line {line}, column {column}: {message}")]
    Decode {
        line: usize,
        column: usize,
        message: String,
    },

    /// Invalid option value or config file content.
    #[error("configuration error: {0}")]
    Config(String),

    /// Config file is not valid TOML.
    #[error("config file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}
