//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, reader, and network-boundary errors, and provides
//! semantic variants for configuration and pipeline-invariant failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene reader error: {0}")]
    Reader(#[from] crate::io::ReaderError),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("Network ensemble error: {0}")]
    Net(#[from] crate::nets::NetError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Required input feature `{feature}` missing from scene")]
    MissingFeature { feature: String },

    #[error("Shape mismatch for `{field}`: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        field: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn missing_feature<S: Into<String>>(feature: S) -> Self {
        Error::MissingFeature {
            feature: feature.into(),
        }
    }
}
