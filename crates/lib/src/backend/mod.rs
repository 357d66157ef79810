//! Configuration backend client.
//!
//! Speaks the FastAPI backend's model and tool configuration endpoints. Every operation is a
//! single round trip returning `Result<_, SyncError>`; nothing here retries or caches.

mod error;
mod models;
mod tools;
mod transport;

pub use error::{ApiResponse, SyncError};
pub use transport::BackendClient;
