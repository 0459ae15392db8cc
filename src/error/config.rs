use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing configuration: {message}")]
    MissingCredentials { message: String },

    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    #[error("failed to read policy file '{path}': {message}")]
    PolicyFileReadError { path: PathBuf, message: String },

    #[error("failed to parse policy file '{path}': {message}")]
    PolicyParseError { path: PathBuf, message: String },

    #[error("unsupported policy format: {format} (expected json or yaml)")]
    UnsupportedFormat { format: String },
}

impl ConfigError {
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::MissingCredentials {
            message: message.into(),
        }
    }

    pub fn invalid_value(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn policy_file_read_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PolicyFileReadError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn policy_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PolicyParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }
}
