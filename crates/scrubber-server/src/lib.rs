//! Scrubber Server: HTTP front door over the analyzer, anonymizer and
//! document redaction engine.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;
