use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use jsonapi_core::{Error, ErrorDocument, ErrorObject, JsonApiResponse, JSON_API_MEDIA_TYPE};

/// Axum response wrapper that renders a [`JsonApiResponse`] with the JSON:API
/// content type and, for creations, a `Location` header.
#[derive(Debug, Clone)]
pub struct DocumentResponse(pub JsonApiResponse);

impl From<JsonApiResponse> for DocumentResponse {
    fn from(r: JsonApiResponse) -> Self {
        Self(r)
    }
}

impl IntoResponse for DocumentResponse {
    fn into_response(self) -> Response {
        let JsonApiResponse {
            status,
            location,
            document,
        } = self.0;

        let mut resp = match document {
            Some(document) => match serde_json::to_vec(&document) {
                Ok(body) => {
                    let mut resp = (status, body).into_response();
                    resp.headers_mut().insert(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static(JSON_API_MEDIA_TYPE),
                    );
                    resp
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize JSON:API document");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            },
            None => status.into_response(),
        };

        if let Some(location) = location {
            match HeaderValue::from_str(&location) {
                Ok(v) => {
                    resp.headers_mut().insert(header::LOCATION, v);
                }
                Err(_) => tracing::warn!(location = %location, "Dropping invalid Location header"),
            }
        }
        resp
    }
}

/// Error document plus an optional explicit status.
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    pub document: ErrorDocument,
    pub status_override: Option<u16>,
}

impl ErrorResponse {
    pub fn new(document: ErrorDocument) -> Self {
        Self {
            document,
            status_override: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_override = Some(status.as_u16());
        self
    }
}

impl From<ErrorDocument> for ErrorResponse {
    fn from(document: ErrorDocument) -> Self {
        Self::new(document)
    }
}

impl From<ErrorObject> for ErrorResponse {
    fn from(error: ErrorObject) -> Self {
        Self::new(error.into())
    }
}

impl From<Error> for ErrorResponse {
    fn from(error: Error) -> Self {
        Self::new(error.into())
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        DocumentResponse(JsonApiResponse::error(self.document, self.status_override)).into_response()
    }
}

/// Router fallback answering unknown paths with a JSON:API 404.
pub async fn not_found() -> ErrorResponse {
    ErrorObject::new(StatusCode::NOT_FOUND)
        .with_code("NOT_FOUND")
        .with_title("Not Found")
        .with_detail("The requested resource does not exist")
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_type(resp: &Response) -> &str {
        resp.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    #[test]
    fn error_response_sets_rolled_up_status_and_content_type() {
        let document = ErrorDocument::new()
            .with_error(ErrorObject::new(StatusCode::NOT_FOUND))
            .with_error(ErrorObject::new(StatusCode::INTERNAL_SERVER_ERROR));
        let resp = ErrorResponse::new(document).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type(&resp), JSON_API_MEDIA_TYPE);
    }

    #[test]
    fn status_override_wins() {
        let resp = ErrorResponse::from(Error::ResourceTypeMissing)
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn empty_response_has_no_content_type() {
        let resp = DocumentResponse(JsonApiResponse {
            status: StatusCode::NO_CONTENT,
            location: None,
            document: None,
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.headers().get(header::CONTENT_TYPE).is_none());
    }
}
