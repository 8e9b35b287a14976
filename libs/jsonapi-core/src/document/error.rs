use super::{Document, DocumentSections};
use crate::error::Error;
use crate::schema::{ErrorObject, JsonApiObject, Links, Meta};

/// Collects error objects and decides the status of the response.
///
/// Errors are kept in insertion order and never de-duplicated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorDocument {
    jsonapi: Option<JsonApiObject>,
    meta: Option<Meta>,
    links: Option<Links>,
    errors: Vec<ErrorObject>,
}

impl ErrorDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: ErrorObject) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn with_error(mut self, error: ErrorObject) -> Self {
        self.errors.push(error);
        self
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

    pub fn errors(&self) -> &[ErrorObject] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Status of the response carrying this document.
    ///
    /// An explicit override wins; otherwise see [`aggregate_status`].
    pub fn response_status(&self, status_override: Option<u16>) -> u16 {
        status_override.unwrap_or_else(|| aggregate_status(self.errors.iter().map(|e| e.status)))
    }

    pub fn into_document(self) -> Document {
        Document::failure(self.jsonapi, self.meta, self.links, self.errors)
    }
}

/// Roll individual error statuses up into one response status.
///
/// A single error keeps its own status. Otherwise the aggregate starts at 500
/// and, for each error, switches to the status rounded down to its hundred
/// whenever the two are at least 100 apart. No errors at all yields 500.
pub fn aggregate_status(statuses: impl IntoIterator<Item = u16>) -> u16 {
    let statuses: Vec<u16> = statuses.into_iter().collect();
    if let [only] = statuses.as_slice() {
        return *only;
    }
    statuses.iter().fold(500, |aggregate, status| {
        let rounded = status / 100 * 100;
        if aggregate.abs_diff(rounded) >= 100 {
            rounded
        } else {
            aggregate
        }
    })
}

impl DocumentSections for ErrorDocument {
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

impl From<ErrorObject> for ErrorDocument {
    fn from(error: ErrorObject) -> Self {
        Self::new().with_error(error)
    }
}

impl From<Error> for ErrorDocument {
    fn from(error: Error) -> Self {
        Self::new().with_error(error.to_error_object())
    }
}

impl FromIterator<ErrorObject> for ErrorDocument {
    fn from_iter<I: IntoIterator<Item = ErrorObject>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}
