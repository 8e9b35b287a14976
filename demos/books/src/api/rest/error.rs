use axum::http::StatusCode;
use jsonapi_core::{Error as JsonApiError, ErrorDocument, ErrorObject, ErrorSource};

use crate::domain::error::DomainError;

/// Helper to create an error object with less boilerplate
fn from_parts(status: StatusCode, code: &str, title: &str, detail: impl Into<String>) -> ErrorObject {
    ErrorObject::new(status)
        .with_code(code)
        .with_title(title)
        .with_detail(detail)
}

/// Map a domain error to a JSON:API error object.
pub fn map_domain_error(e: &DomainError) -> ErrorObject {
    match e {
        DomainError::BookNotFound { .. } => {
            from_parts(StatusCode::NOT_FOUND, "BOOKS_NOT_FOUND", "Book not found", e.to_string())
        }
        DomainError::AuthorNotFound { .. } | DomainError::PublisherNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "BOOKS_RELATED_NOT_FOUND",
            "Related resource not found",
            e.to_string(),
        )
        .with_source(ErrorSource::pointer("/data/relationships")),
        DomainError::BookAlreadyExists { .. } => from_parts(
            StatusCode::CONFLICT,
            "BOOKS_ALREADY_EXISTS",
            "Book already exists",
            e.to_string(),
        )
        .with_source(ErrorSource::pointer("/data/id")),
        DomainError::IdMismatch { .. } => {
            from_parts(StatusCode::CONFLICT, "BOOKS_ID_MISMATCH", "Id mismatch", e.to_string())
                .with_source(ErrorSource::pointer("/data/id"))
        }
        // reported with the protocol-level code so clients see one sort error
        DomainError::UnsupportedSort { .. } => JsonApiError::SortingUnsupported
            .to_error_object()
            .with_detail(e.to_string()),
        DomainError::Validation { field, .. } => {
            from_parts(StatusCode::UNPROCESSABLE_ENTITY, "BOOKS_VALIDATION", "Validation error", e.to_string())
                .with_source(ErrorSource::pointer(format!("/data/attributes/{field}")))
        }
    }
}

impl From<DomainError> for ErrorDocument {
    fn from(e: DomainError) -> Self {
        ErrorDocument::from(map_domain_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let doc = ErrorDocument::from(DomainError::book_not_found("9"));
        assert_eq!(doc.response_status(None), 404);
        assert_eq!(doc.errors()[0].code.as_deref(), Some("BOOKS_NOT_FOUND"));
    }

    #[test]
    fn sort_errors_point_at_parameter() {
        let obj = map_domain_error(&DomainError::UnsupportedSort { field: "isbn".into() });
        assert_eq!(obj.status, 400);
        assert_eq!(obj.code.as_deref(), Some("SORTING_UNSUPPORTED"));
        assert_eq!(obj.detail.as_deref(), Some("Books cannot be sorted by 'isbn'"));
        assert_eq!(
            obj.source.as_ref().and_then(|s| s.parameter.as_deref()),
            Some("sort")
        );
    }
}
