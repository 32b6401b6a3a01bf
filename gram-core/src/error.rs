use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read environment file {}: {source}", .path.display())]
    Io { source: io::Error, path: PathBuf },
    #[error("Missing required environment variable: {0}")]
    MissingKey(String),
    #[error("Environment variable {0} is empty")]
    EmptyValue(String),
    #[error("failed to prepare profile directory {}: {source}", .path.display())]
    Profile { source: io::Error, path: PathBuf },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
