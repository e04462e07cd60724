use thiserror::Error;

/// Library error type for carousel operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The document holds no slide elements to rotate through.
    #[error("no slides found in document")]
    MissingSlides,

    /// Every slide needs exactly one indicator at the same position.
    #[error("found {indicators} indicators for {slides} slides")]
    IndicatorMismatch { slides: usize, indicators: usize },

    /// A configured slide directory is missing or not a directory.
    #[error("invalid slide directory: {0}")]
    BadDir(String),

    /// The slide directory itself could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
