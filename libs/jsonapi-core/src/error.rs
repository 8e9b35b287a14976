use http::StatusCode;
use thiserror::Error;

use crate::schema::{ErrorObject, ErrorSource};

/// Unified error type for negotiation, query parsing, document construction
/// and hydration.
///
/// Collaborator failures (repositories, lazy relationship loading) travel in
/// [`Error::Domain`] untouched; the HTTP binding decides how to render them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("media type '{media_type}' is not supported")]
    MediaTypeUnsupported { media_type: String },

    #[error("media type '{media_type}' is not acceptable")]
    MediaTypeUnacceptable { media_type: String },

    #[error("query parameter '{param}' is not recognized")]
    QueryParamUnrecognized { param: String },

    #[error("A resource type must be included in the document!")]
    ResourceTypeMissing,

    #[error("resource type '{given}' is not acceptable (expected one of: {})", accepted.join(", "))]
    ResourceTypeUnacceptable { given: String, accepted: Vec<String> },

    #[error("client-generated id '{id}' is not supported")]
    ClientGeneratedIdNotSupported { id: String },

    #[error("client-generated id '{id}' already exists")]
    ClientGeneratedIdAlreadyExists { id: String },

    #[error("A resource id must be included in the document!")]
    ResourceIdMissing,

    #[error("request body is not valid JSON: {0}")]
    RequestBodyInvalidJson(String),

    #[error("request body exceeds the limit of {limit} bytes")]
    RequestBodyTooLarge { limit: usize },

    #[error("relationship '{name}' does not exist")]
    RelationshipNotExists { name: String },

    #[error("relationship '{name}' must be a {expected} relationship, got {given}")]
    RelationshipTypeInappropriate {
        name: String,
        given: &'static str,
        expected: &'static str,
    },

    #[error("inclusion of related resources is not supported")]
    InclusionUnsupported,

    #[error("sorting is not supported")]
    SortingUnsupported,

    #[error(transparent)]
    Domain(#[from] anyhow::Error),
}

impl Error {
    /// Wrap an application error raised by a collaborator.
    pub fn domain<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Domain(anyhow::Error::new(e))
    }

    /// Recover a typed application error from [`Error::Domain`].
    ///
    /// Returns `Err(self)` when this is not a domain error or the payload has
    /// another type.
    pub fn downcast_domain<D>(self) -> Result<D, Self>
    where
        D: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        match self {
            Error::Domain(inner) => inner.downcast::<D>().map_err(Error::Domain),
            other => Err(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::MediaTypeUnsupported { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::MediaTypeUnacceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            Error::QueryParamUnrecognized { .. }
            | Error::ResourceIdMissing
            | Error::RequestBodyInvalidJson(_)
            | Error::InclusionUnsupported
            | Error::SortingUnsupported => StatusCode::BAD_REQUEST,
            Error::ResourceTypeMissing
            | Error::ResourceTypeUnacceptable { .. }
            | Error::ClientGeneratedIdAlreadyExists { .. }
            | Error::RelationshipTypeInappropriate { .. } => StatusCode::CONFLICT,
            Error::ClientGeneratedIdNotSupported { .. } => StatusCode::FORBIDDEN,
            Error::RequestBodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::RelationshipNotExists { .. } => StatusCode::NOT_FOUND,
            Error::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code placed into the `code` member of the error object.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MediaTypeUnsupported { .. } => "MEDIA_TYPE_UNSUPPORTED",
            Error::MediaTypeUnacceptable { .. } => "MEDIA_TYPE_UNACCEPTABLE",
            Error::QueryParamUnrecognized { .. } => "QUERY_PARAM_UNRECOGNIZED",
            Error::ResourceTypeMissing => "RESOURCE_TYPE_MISSING",
            Error::ResourceTypeUnacceptable { .. } => "RESOURCE_TYPE_UNACCEPTABLE",
            Error::ClientGeneratedIdNotSupported { .. } => "CLIENT_GENERATED_ID_NOT_SUPPORTED",
            Error::ClientGeneratedIdAlreadyExists { .. } => "CLIENT_GENERATED_ID_ALREADY_EXISTS",
            Error::ResourceIdMissing => "RESOURCE_ID_MISSING",
            Error::RequestBodyInvalidJson(_) => "REQUEST_BODY_INVALID_JSON",
            Error::RequestBodyTooLarge { .. } => "REQUEST_BODY_TOO_LARGE",
            Error::RelationshipNotExists { .. } => "RELATIONSHIP_NOT_EXISTS",
            Error::RelationshipTypeInappropriate { .. } => "RELATIONSHIP_TYPE_INAPPROPRIATE",
            Error::InclusionUnsupported => "INCLUSION_UNSUPPORTED",
            Error::SortingUnsupported => "SORTING_UNSUPPORTED",
            Error::Domain(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Error::MediaTypeUnsupported { .. } => "The provided media type is unsupported",
            Error::MediaTypeUnacceptable { .. } => "The provided media type is unacceptable",
            Error::QueryParamUnrecognized { .. } => "Query parameter is unrecognized",
            Error::ResourceTypeMissing => "Resource type is missing",
            Error::ResourceTypeUnacceptable { .. } => "Resource type is unacceptable",
            Error::ClientGeneratedIdNotSupported { .. } => "Client-generated ID is not supported",
            Error::ClientGeneratedIdAlreadyExists { .. } => "Client-generated ID already exists",
            Error::ResourceIdMissing => "Resource ID is missing",
            Error::RequestBodyInvalidJson(_) => "Request body is invalid JSON",
            Error::RequestBodyTooLarge { .. } => "Request body is too large",
            Error::RelationshipNotExists { .. } => "The requested relationship does not exist",
            Error::RelationshipTypeInappropriate { .. } => "Relationship type is inappropriate",
            Error::InclusionUnsupported => "Inclusion is unsupported",
            Error::SortingUnsupported => "Sorting is unsupported",
            Error::Domain(_) => "Internal Server Error",
        }
    }

    fn source(&self) -> Option<ErrorSource> {
        match self {
            Error::QueryParamUnrecognized { param } => Some(ErrorSource::parameter(param)),
            Error::InclusionUnsupported => Some(ErrorSource::parameter("include")),
            Error::SortingUnsupported => Some(ErrorSource::parameter("sort")),
            Error::ResourceTypeMissing | Error::ResourceTypeUnacceptable { .. } => {
                Some(ErrorSource::pointer("/data/type"))
            }
            Error::ClientGeneratedIdNotSupported { .. }
            | Error::ClientGeneratedIdAlreadyExists { .. }
            | Error::ResourceIdMissing => Some(ErrorSource::pointer("/data/id")),
            Error::RelationshipTypeInappropriate { name, .. } => Some(ErrorSource::pointer(
                format!("/data/relationships/{name}"),
            )),
            Error::RequestBodyInvalidJson(_) => Some(ErrorSource::pointer("")),
            _ => None,
        }
    }

    /// Materialize this error as a JSON:API error object.
    pub fn to_error_object(&self) -> ErrorObject {
        let detail = match self {
            Error::Domain(inner) => {
                // Internal details stay in the logs
                tracing::error!(error = ?inner, "Domain error surfaced as JSON:API error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let mut object = ErrorObject::new(self.status())
            .with_code(self.code())
            .with_title(self.title())
            .with_detail(detail);
        if let Some(source) = self.source() {
            object = object.with_source(source);
        }
        object
    }
}
