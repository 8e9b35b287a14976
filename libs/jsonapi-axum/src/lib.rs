//! Axum binding for `jsonapi-core`.
//!
//! Provides the [`JsonApi`] request extractor, response wrappers carrying the
//! `application/vnd.api+json` content type, and [`ApiError`] for handlers.

pub mod error;
pub mod extract;
pub mod response;

pub use error::{ApiError, ApiResult};
pub use extract::{JsonApi, MAX_BODY_BYTES};
pub use response::{not_found, DocumentResponse, ErrorResponse};

pub use jsonapi_core;
