//! # jsonapi-core
//!
//! Transport-agnostic JSON:API building blocks.
//!
//! - **Negotiation**: `Content-Type` / `Accept` media types and `ext` tokens
//! - **Request intent**: sparse fieldsets, include tree, sorting, pagination
//!   and filtering, computed lazily from the query parameters
//! - **Documents**: a transformer graph rendered into single, collection,
//!   relationship and error documents
//! - **Hydration**: write payloads mapped onto domain objects
//!
//! ## Example
//!
//! ```rust,ignore
//! let request = JsonApiRequest::get("include=authors&fields[books]=title");
//! let response = Responder::new(&request).ok(&(), Some(&book), &book_transformer)?;
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod hydrator;
pub mod media_type;
pub mod request;
pub mod response;
pub mod schema;
pub mod transformer;

pub use config::JsonApiConfig;
pub use document::{aggregate_status, Document, DocumentSections, ErrorDocument, StaticSections};
pub use error::Error;
pub use hydrator::{Hydrator, RelationshipPayload, ToManyRelationship, ToOneRelationship};
pub use media_type::{MediaType, JSON_API_MEDIA_TYPE};
pub use request::{
    CursorPagination, IncludeTree, JsonApiRequest, OffsetPagination, PagePagination, QueryParams, QueryValue,
    SortDir, SortField,
};
pub use response::{JsonApiResponse, RelationshipResponder, Responder};
pub use schema::{
    Attributes, ErrorObject, ErrorSource, JsonApiObject, Link, Linkage, Links, Meta, PrimaryData,
    RelationshipObject, ResourceIdentifier, ResourceObject,
};
pub use transformer::{BoundResource, Relationship, RelationshipData, ResourceTransformer};

pub type Result<T> = std::result::Result<T, Error>;
