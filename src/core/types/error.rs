use thiserror::Error;

use crate::core::harness::parser::SpectrumFormatError;

pub type AppResult<T> = Result<T, AppError>;

/// Top-level error type for the application. Per-commit failures during a
/// campaign are logged and skipped rather than propagated; everything that
/// does propagate ends up here.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("git error: {0}")]
    Git(String),

    #[error("test harness error: {0}")]
    Harness(String),

    #[error("could not parse harness output {path}: {source}")]
    Spectrum {
        path: String,
        #[source]
        source: SpectrumFormatError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("{0}")]
    Custom(String),
}
