use crate::api::ApiError;
use crate::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("IO/Terminal error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API error: {0}")]
    ApiError(#[from] ApiError),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Render error: {0}")]
    RenderError(String),
}
