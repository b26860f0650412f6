//! Scrubber Store: key-value cache backends plus the custom recognizer
//! and template stores built on top of them.

pub mod cache;
pub mod recognizers;
pub mod schema;
pub mod sqlite;
pub mod templates;
pub mod types;

pub use cache::{Cache, MemoryCache};
pub use recognizers::RecognizerStore;
pub use sqlite::SqliteCache;
pub use templates::{TemplateAction, TemplateStore};
pub use types::*;
