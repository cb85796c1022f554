//! Request and response types shared by the HTTP handlers

pub mod data;
pub mod error;
pub mod json;
pub mod query;

pub use data::Data;
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use query::Query;
