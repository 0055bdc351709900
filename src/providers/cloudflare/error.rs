use crate::error::Error;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum CloudflareError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub fn map_error(e: CloudflareError) -> Error {
    Error::Provider(e.to_string())
}
