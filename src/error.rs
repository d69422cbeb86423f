//! Error type shared by persistence, configuration and the binary

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Map file {path} is not valid: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not encode map: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("No room numbered {0}")]
    NoSuchRoom(usize),
}

impl MapperError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapperError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;
