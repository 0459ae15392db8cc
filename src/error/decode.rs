use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("failed to download '{asset}': {message}")]
    FetchFailed { asset: String, message: String },

    #[error("unrecognized image format: {message}")]
    UnsupportedFormat { message: String },

    #[error("failed to encode preview: {message}")]
    PreviewEncode { message: String },
}

impl DecodeError {
    pub fn fetch_failed(asset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            asset: asset.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    pub fn preview_encode(message: impl Into<String>) -> Self {
        Self::PreviewEncode {
            message: message.into(),
        }
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(err: image::ImageError) -> Self {
        Self::unsupported_format(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failed_display() {
        let err = DecodeError::fetch_failed("IMG_0001.jpg", "HTTP 404");
        assert_eq!(err.to_string(), "failed to download 'IMG_0001.jpg': HTTP 404");
    }
}
