//! Scrubber Core: shared error type, configuration, data paths.

pub mod config;
pub mod error;

pub use config::{DataPaths, ScrubberConfig, StoreBackend};
pub use error::{Error, Result};
