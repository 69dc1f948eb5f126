pub mod error;
pub mod gateway;

// Re-export so callers can do "use crate::client::{ApiError, Gateway}".
pub use error::ApiError;
pub use gateway::{Gateway, RequestOptions};
