//! HTTP/JSON API

pub mod error;
pub mod handlers;
pub mod server;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use server::{router, ApiServer};
