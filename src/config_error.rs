//! Error handling for the session configuration loader

use std::io;

/// Unified error to report failures while reading and validating a
/// session configuration file.
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    MissingField(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ConfigError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ConfigError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ConfigError::MissingField(ref field) =>
                write!(f, "Missing Field: {}", field),
            ConfigError::InvalidValue(ref msg) =>
                write!(f, "Invalid Value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}
