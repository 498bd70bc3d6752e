//! Error types for the CLI application.

use partydeck_server::{MatchError, RegistryError};
use std::fmt;

/// Everything a command handler can fail with. Every variant maps to exit code `2`.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (deck files, stdout/stderr writes, runtime setup)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// The match itself failed
    Match(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Match(msg) => write!(f, "Match error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<MatchError> for CliError {
    fn from(error: MatchError) -> Self {
        CliError::Match(error.to_string())
    }
}

impl From<RegistryError> for CliError {
    fn from(error: RegistryError) -> Self {
        CliError::Match(error.to_string())
    }
}
