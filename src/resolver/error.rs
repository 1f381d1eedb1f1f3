//! Error types for the location resolver.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening a location dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to open dataset {}: {message}", path.display())]
    Open { path: PathBuf, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors returned by [`LocationResolver::init`](super::LocationResolver::init).
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("failed to watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("dataset path {} has no file name", .0.display())]
    InvalidPath(PathBuf),

    #[error("file watching requires a running tokio runtime")]
    NoRuntime,
}
