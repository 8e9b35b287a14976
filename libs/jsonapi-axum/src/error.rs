use std::fmt;

use axum::response::IntoResponse;
use jsonapi_core::{Error as JsonApiError, ErrorDocument};

use crate::response::ErrorResponse;

/// Unified API error type that handles all errors at the API boundary
///
/// Handlers return `ApiResult<_, D>` and use `?` on both JSON:API and domain
/// errors; both become a JSON:API error document.
///
/// A domain error that travelled through a transformer as
/// [`JsonApiError::Domain`] is recovered as `D` when it has that type.
#[derive(thiserror::Error, Debug)]
pub enum ApiError<D> {
    /// Negotiation, query, document and hydration errors
    #[error(transparent)]
    JsonApi(JsonApiError),

    /// Domain business logic errors
    #[error(transparent)]
    Domain(D),
}

impl<D> ApiError<D> {
    pub fn from_domain(e: D) -> Self {
        ApiError::Domain(e)
    }
}

impl<D> From<JsonApiError> for ApiError<D> {
    fn from(e: JsonApiError) -> Self {
        ApiError::JsonApi(e)
    }
}

impl<D> IntoResponse for ApiError<D>
where
    D: Into<ErrorDocument> + fmt::Display + fmt::Debug + Send + Sync + 'static,
{
    fn into_response(self) -> axum::response::Response {
        let document: ErrorDocument = match self {
            ApiError::JsonApi(e) => match e.downcast_domain::<D>() {
                Ok(domain) => domain.into(),
                Err(other) => other.into(),
            },
            ApiError::Domain(e) => e.into(),
        };
        ErrorResponse::new(document).into_response()
    }
}

/// Generic Result type for API handlers.
/// Each module typically defines its own alias: `type BooksResult<T> = ApiResult<T, DomainError>;`
pub type ApiResult<T, D> = Result<T, ApiError<D>>;
