//! Address to location resolution backed by a hot-reloadable dataset.

mod dataset;
mod error;
mod service;

pub use dataset::{DatasetEntry, JsonDataset, LocationDataset, MaxMindDataset};
pub use error::{DatasetError, ResolverError};
pub use service::{LocationResolver, ResolverOptions, DEFAULT_RELOAD_DEBOUNCE};
