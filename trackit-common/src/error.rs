//! Error type shared by the TrackIt crates

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file exists but is not valid TOML for [`TomlConfig`]
    ///
    /// [`TomlConfig`]: crate::config::TomlConfig
    #[error("Config file {path} is invalid: {reason}")]
    Config { path: PathBuf, reason: String },

    /// A row that was just written could not be read back
    #[error("Inconsistent database state: {0}")]
    Inconsistent(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_message_names_file() {
        let err = Error::Config {
            path: PathBuf::from("/etc/trackit/config.toml"),
            reason: "expected a table".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Config file /etc/trackit/config.toml is invalid: expected a table"
        );
    }
}
