//! Errors raised while querying the CMS

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmsError {
    #[error("CMS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CMS responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode CMS response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CMS configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, CmsError>;
