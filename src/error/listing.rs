use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("listing request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("listing request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid listing response: {message}")]
    InvalidResponse { message: String },

    #[error("download of '{asset}' exceeds {limit} bytes")]
    DownloadTooLarge { asset: String, limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to scan directory at {path}: {source}")]
    DirectoryScanError {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl ListingError {
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn status(url: impl Into<String>, status: u16) -> Self {
        Self::Status {
            url: url.into(),
            status,
        }
    }

    pub fn download_too_large(asset: impl Into<String>, limit: u64) -> Self {
        Self::DownloadTooLarge {
            asset: asset.into(),
            limit,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
