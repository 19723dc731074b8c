//! Errors raised while reading or checking `mcsite.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("mcsite.toml is not valid TOML for this site layout")]
    Toml(#[from] toml::de::Error),

    #[error("invalid setting: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_error_names_file_and_keeps_source() {
        let err = ConfigError::Io(
            PathBuf::from("site/mcsite.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "cannot read config file site/mcsite.toml");
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string).as_deref(),
            Some("denied")
        );
    }

    #[test]
    fn test_validation_message() {
        let err = ConfigError::Validation("[base.url] is required".into());
        assert_eq!(err.to_string(), "invalid setting: [base.url] is required");
    }
}
