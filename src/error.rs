use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("GitLab API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
