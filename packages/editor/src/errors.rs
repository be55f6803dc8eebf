//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image could not be encoded in any supported format")]
    ImageEncoding,

    #[error("No image popup is open")]
    NoActiveImage,

    #[error("No link popup is open")]
    NoActiveLink,
}

impl EditorError {
    pub(crate) fn invalid_selector(selector: &str, reason: impl Into<String>) -> Self {
        EditorError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}
