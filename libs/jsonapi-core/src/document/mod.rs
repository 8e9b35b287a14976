//! Response documents and the pipeline that builds them.

mod error;
mod pipeline;

pub use self::error::{aggregate_status, ErrorDocument};
pub(crate) use self::pipeline::{build_relationship, build_resources, Primary};

use serde::Serialize;

use crate::schema::{ErrorObject, JsonApiObject, Links, Meta, PrimaryData, ResourceObject};

/// The overridable top-level members of a document.
///
/// Implement this on a per-endpoint type to attach `jsonapi`, `meta` or
/// `links`; `()` leaves them all to the defaults.
pub trait DocumentSections {
    /// `None` falls back to the configured version.
    fn jsonapi(&self) -> Option<JsonApiObject> {
        None
    }

    fn meta(&self) -> Option<Meta> {
        None
    }

    fn links(&self) -> Option<Links> {
        None
    }
}

impl DocumentSections for () {}

/// Fixed sections assembled with a builder.
#[derive(Clone, Debug, Default)]
pub struct StaticSections {
    jsonapi: Option<JsonApiObject>,
    meta: Option<Meta>,
    links: Option<Links>,
}

impl StaticSections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jsonapi(mut self, jsonapi: JsonApiObject) -> Self {
        self.jsonapi = Some(jsonapi);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }
}

impl DocumentSections for StaticSections {
    fn jsonapi(&self) -> Option<JsonApiObject> {
        self.jsonapi.clone()
    }

    fn meta(&self) -> Option<Meta> {
        self.meta.clone()
    }

    fn links(&self) -> Option<Links> {
        self.links.clone()
    }
}

/// A fully built top-level document.
///
/// A document carries either `data` or `errors`, never both; the only way to
/// obtain one is through the success and error constructors.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    jsonapi: Option<JsonApiObject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<Links>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<PrimaryData>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    included: Vec<ResourceObject>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ErrorObject>,
}

impl Document {
    pub(crate) fn success(
        jsonapi: Option<JsonApiObject>,
        meta: Option<Meta>,
        links: Option<Links>,
        data: PrimaryData,
        included: Vec<ResourceObject>,
    ) -> Self {
        Self {
            jsonapi,
            meta,
            links: links.filter(|l| !l.is_empty()),
            data: Some(data),
            included,
            errors: Vec::new(),
        }
    }

    pub(crate) fn failure(
        jsonapi: Option<JsonApiObject>,
        meta: Option<Meta>,
        links: Option<Links>,
        errors: Vec<ErrorObject>,
    ) -> Self {
        Self {
            jsonapi,
            meta,
            links: links.filter(|l| !l.is_empty()),
            data: None,
            included: Vec::new(),
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    pub fn jsonapi(&self) -> Option<&JsonApiObject> {
        self.jsonapi.as_ref()
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    pub fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    pub fn data(&self) -> Option<&PrimaryData> {
        self.data.as_ref()
    }

    pub fn included(&self) -> &[ResourceObject] {
        &self.included
    }

    pub fn errors(&self) -> &[ErrorObject] {
        &self.errors
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
