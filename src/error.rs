use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    #[error("Router rejected password for user {0}")]
    NotAuthenticated(String),

    #[error("Connection to {0} timed out")]
    Timeout(String),

    #[error("Unknown router driver: {0}")]
    UnknownDriver(String),

    #[error("Invalid output pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
