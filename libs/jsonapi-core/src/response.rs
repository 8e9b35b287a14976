//! Transport-neutral responses: a status, an optional `Location` and an
//! optional document.

use http::StatusCode;

use crate::document::{build_relationship, build_resources, Document, DocumentSections, ErrorDocument, Primary};
use crate::error::Error;
use crate::request::JsonApiRequest;
use crate::schema::PrimaryData;
use crate::transformer::{BoundResource, ResourceTransformer};

/// The media type every JSON:API response body is sent with.
pub const CONTENT_TYPE: &str = crate::media_type::JSON_API_MEDIA_TYPE;

#[derive(Clone, Debug, PartialEq)]
pub struct JsonApiResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub document: Option<Document>,
}

impl JsonApiResponse {
    fn with_document(status: StatusCode, document: Document) -> Self {
        Self {
            status,
            location: None,
            document: Some(document),
        }
    }

    fn empty(status: StatusCode) -> Self {
        Self {
            status,
            location: None,
            document: None,
        }
    }

    /// Error response with the rolled-up (or overridden) status.
    pub fn error(document: ErrorDocument, status_override: Option<u16>) -> Self {
        let status = StatusCode::from_u16(document.response_status(status_override))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::with_document(status, document.into_document())
    }
}

impl From<Error> for JsonApiResponse {
    fn from(error: Error) -> Self {
        Self::error(ErrorDocument::from(error), None)
    }
}

/// Builds success responses for one request.
///
/// Nothing is written anywhere until the whole document has been built, so a
/// failing transformer never leaves a partial body behind.
pub struct Responder<'r> {
    request: &'r JsonApiRequest,
}

impl<'r> Responder<'r> {
    pub fn new(request: &'r JsonApiRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &'r JsonApiRequest {
        self.request
    }

    /// `200 OK` with a single resource, or `null` data for `None`.
    pub fn ok<T, R>(&self, sections: &dyn DocumentSections, object: Option<&T>, transformer: &R) -> Result<JsonApiResponse, Error>
    where
        R: ResourceTransformer<T> + ?Sized,
    {
        let primary = object.map(|o| BoundResource::new(o, transformer));
        let document = build_resources(self.request, sections, Primary::Single(primary))?;
        Ok(JsonApiResponse::with_document(StatusCode::OK, document))
    }

    /// `200 OK` with a homogeneous collection.
    pub fn ok_collection<T, R>(&self, sections: &dyn DocumentSections, objects: &[T], transformer: &R) -> Result<JsonApiResponse, Error>
    where
        R: ResourceTransformer<T> + ?Sized,
    {
        let primary = objects.iter().map(|o| BoundResource::new(o, transformer)).collect();
        let document = build_resources(self.request, sections, Primary::Many(primary))?;
        Ok(JsonApiResponse::with_document(StatusCode::OK, document))
    }

    /// `200 OK` with a collection that may mix resource types.
    pub fn ok_resources(&self, sections: &dyn DocumentSections, resources: Vec<BoundResource<'_>>) -> Result<JsonApiResponse, Error> {
        let document = build_resources(self.request, sections, Primary::Many(resources))?;
        Ok(JsonApiResponse::with_document(StatusCode::OK, document))
    }

    /// `201 Created`. `Location` is the resource's `self` link, falling back
    /// to the document's.
    pub fn created<T, R>(&self, sections: &dyn DocumentSections, object: &T, transformer: &R) -> Result<JsonApiResponse, Error>
    where
        R: ResourceTransformer<T> + ?Sized,
    {
        let primary = Some(BoundResource::new(object, transformer));
        let document = build_resources(self.request, sections, Primary::Single(primary))?;
        let location = self_link(&document);
        Ok(JsonApiResponse {
            status: StatusCode::CREATED,
            location,
            document: Some(document),
        })
    }

    /// `202 Accepted` with a document describing the pending job.
    pub fn accepted<T, R>(&self, sections: &dyn DocumentSections, object: &T, transformer: &R) -> Result<JsonApiResponse, Error>
    where
        R: ResourceTransformer<T> + ?Sized,
    {
        let primary = Some(BoundResource::new(object, transformer));
        let document = build_resources(self.request, sections, Primary::Single(primary))?;
        Ok(JsonApiResponse::with_document(StatusCode::ACCEPTED, document))
    }

    pub fn no_content(&self) -> JsonApiResponse {
        JsonApiResponse::empty(StatusCode::NO_CONTENT)
    }

    /// Any status without a body.
    pub fn generic_success(&self, status: StatusCode) -> JsonApiResponse {
        JsonApiResponse::empty(status)
    }

    /// Responses for the relationship endpoint of `name`.
    pub fn relationship(&self, name: &'r str) -> RelationshipResponder<'r> {
        RelationshipResponder {
            request: self.request,
            name,
        }
    }

    pub fn error_document(&self, document: ErrorDocument, status_override: Option<u16>) -> JsonApiResponse {
        JsonApiResponse::error(document, status_override)
    }
}

fn self_link(document: &Document) -> Option<String> {
    let from_resource = match document.data() {
        Some(PrimaryData::Resource(Some(resource))) => resource
            .links
            .as_ref()
            .and_then(|l| l.get("self"))
            .map(|l| l.href().to_string()),
        _ => None,
    };
    from_resource.or_else(|| {
        document
            .links()
            .and_then(|l| l.get("self"))
            .map(|l| l.href().to_string())
    })
}

/// Identifier-only responses for one relationship.
pub struct RelationshipResponder<'r> {
    request: &'r JsonApiRequest,
    name: &'r str,
}

impl RelationshipResponder<'_> {
    /// `200 OK` with the relationship's linkage as primary data.
    pub fn ok<T, R>(&self, sections: &dyn DocumentSections, object: &T, transformer: &R) -> Result<JsonApiResponse, Error>
    where
        R: ResourceTransformer<T> + ?Sized,
    {
        let resource = BoundResource::new(object, transformer);
        let document = build_relationship(self.request, sections, &resource, self.name)?;
        Ok(JsonApiResponse::with_document(StatusCode::OK, document))
    }

    pub fn no_content(&self) -> JsonApiResponse {
        JsonApiResponse::empty(StatusCode::NO_CONTENT)
    }
}
