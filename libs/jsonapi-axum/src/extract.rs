use std::ops::Deref;
use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, RawPathParams, Request};
use http_body_util::LengthLimitError;
use jsonapi_core::{Error, JsonApiConfig, JsonApiRequest, QueryParams};
use tracing::debug;

use crate::response::ErrorResponse;

/// Largest request document the extractor will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Path parameter taken as the addressed resource id.
pub const RESOURCE_ID_PARAM: &str = "id";

/// Axum extractor for a negotiated, validated JSON:API request.
///
/// Rejects with a JSON:API error document before the handler runs when the
/// media types, `ext` tokens or query parameters are not acceptable, or when
/// the body is not JSON. The process-wide [`JsonApiConfig`] is read from an
/// `Extension<Arc<JsonApiConfig>>` layer; defaults apply without one.
///
/// Usage in handlers:
///   async fn show_book(JsonApi(request): JsonApi, /* ... */) { /* ... */ }
#[derive(Debug, Clone)]
pub struct JsonApi(pub JsonApiRequest);

impl JsonApi {
    #[inline]
    pub fn into_inner(self) -> JsonApiRequest {
        self.0
    }
}

impl Deref for JsonApi {
    type Target = JsonApiRequest;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequest<S> for JsonApi
where
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let config = parts
            .extensions
            .get::<Arc<JsonApiConfig>>()
            .cloned()
            .unwrap_or_default();
        let resource_id = RawPathParams::from_request_parts(&mut parts, state)
            .await
            .ok()
            .and_then(|params| {
                params
                    .iter()
                    .find(|(key, _)| *key == RESOURCE_ID_PARAM)
                    .map(|(_, value)| value.to_string())
            });
        let query = QueryParams::parse(parts.uri.query().unwrap_or(""));

        let mut request = JsonApiRequest::new(parts.method, parts.headers, query, None).with_config(config);
        if let Some(id) = resource_id {
            request = request.with_resource_id(id);
        }

        request.validate()?;

        let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(body_error)?;
        if let Some(body) = JsonApiRequest::parse_body(&bytes)? {
            request = request.with_body(body);
        }

        debug!(
            method = %request.method(),
            resource_id = ?request.resource_id(),
            "Accepted JSON:API request"
        );
        Ok(JsonApi(request))
    }
}

/// A body over [`MAX_BODY_BYTES`] is 413; any other read failure is reported
/// as an unreadable document.
fn body_error(e: axum::Error) -> Error {
    let inner = e.into_inner();
    let over_limit = std::iter::successors(Some(&*inner as &(dyn std::error::Error + 'static)), |e| e.source())
        .any(|e| e.is::<LengthLimitError>());
    if over_limit {
        debug!(limit = MAX_BODY_BYTES, "Request body over limit");
        Error::RequestBodyTooLarge { limit: MAX_BODY_BYTES }
    } else {
        Error::RequestBodyInvalidJson(inner.to_string())
    }
}
