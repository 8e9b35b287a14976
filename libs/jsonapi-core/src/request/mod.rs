//! The request intent: a typed, lazily evaluated view over an HTTP request.

mod include;
mod pagination;
mod query;
mod sorting;

pub use self::include::IncludeTree;
pub use self::pagination::{CursorPagination, OffsetPagination, PagePagination, PAGE_PARAM};
pub use self::query::{QueryParams, QueryValue};
pub use self::sorting::{parse_sort, SortDir, SortField};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::warn;

use crate::config::JsonApiConfig;
use crate::error::Error;
use crate::media_type;

/// Top-level query parameters JSON:API reserves for itself.
pub const RECOGNIZED_QUERY_PARAMS: [&str; 5] = ["fields", "include", "sort", "page", "filter"];

/// Views derived from the query parameters, computed on first access.
#[derive(Clone, Debug, Default)]
struct Intent {
    fields: OnceCell<BTreeMap<String, BTreeSet<String>>>,
    include: OnceCell<Option<IncludeTree>>,
    sorting: OnceCell<Vec<String>>,
    pagination: OnceCell<BTreeMap<String, String>>,
    filtering: OnceCell<BTreeMap<String, String>>,
}

/// One inbound JSON:API request.
///
/// Owned by a single request; the cached views are never shared. Replacing
/// the query parameters goes through [`with_query_params`](Self::with_query_params),
/// which yields a new value with empty caches.
#[derive(Clone, Debug)]
pub struct JsonApiRequest {
    method: Method,
    headers: HeaderMap,
    query: QueryParams,
    body: Option<Value>,
    resource_id: Option<String>,
    config: Arc<JsonApiConfig>,
    intent: Intent,
}

impl JsonApiRequest {
    pub fn new(method: Method, headers: HeaderMap, query: QueryParams, body: Option<Value>) -> Self {
        Self {
            method,
            headers,
            query,
            body,
            resource_id: None,
            config: Arc::new(JsonApiConfig::default()),
            intent: Intent::default(),
        }
    }

    /// `GET` request with a raw query string and no headers.
    pub fn get(query: &str) -> Self {
        Self::new(Method::GET, HeaderMap::new(), QueryParams::parse(query), None)
    }

    /// Decode a request body. An empty body yields `None`.
    pub fn parse_body(bytes: &[u8]) -> Result<Option<Value>, Error> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(bytes)
            .map(Some)
            .map_err(|e| Error::RequestBodyInvalidJson(e.to_string()))
    }

    pub fn with_config(mut self, config: Arc<JsonApiConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn with_resource_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Copy of this request with other query parameters and fresh caches.
    pub fn with_query_params(&self, query: QueryParams) -> Self {
        Self {
            method: self.method.clone(),
            headers: self.headers.clone(),
            query,
            body: self.body.clone(),
            resource_id: self.resource_id.clone(),
            config: Arc::clone(&self.config),
            intent: Intent::default(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn is_write(&self) -> bool {
        self.method == Method::POST || self.method == Method::PATCH
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query
    }

    pub fn config(&self) -> &JsonApiConfig {
        &self.config
    }

    /// Path id of the addressed resource, supplied by the HTTP binding.
    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    fn header_values(&self, name: HeaderName) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    // --- negotiation ---

    /// Extensions applied to the request document (`Content-Type`).
    pub fn extensions(&self) -> Vec<String> {
        media_type::extensions(self.header_values(CONTENT_TYPE))
    }

    /// Extensions the client requires in the response (`Accept`).
    pub fn required_extensions(&self) -> Vec<String> {
        media_type::extensions(self.header_values(ACCEPT))
    }

    pub fn validate_content_type_header(&self) -> Result<(), Error> {
        match media_type::find_non_compliant_media_type(self.header_values(CONTENT_TYPE)) {
            Some(mt) => {
                warn!(media_type = %mt.raw(), "Rejecting non-compliant Content-Type");
                Err(Error::MediaTypeUnsupported {
                    media_type: mt.raw().to_string(),
                })
            }
            None => Ok(()),
        }
    }

    pub fn validate_accept_header(&self) -> Result<(), Error> {
        match media_type::find_non_compliant_media_type(self.header_values(ACCEPT)) {
            Some(mt) => {
                warn!(media_type = %mt.raw(), "Rejecting non-compliant Accept");
                Err(Error::MediaTypeUnacceptable {
                    media_type: mt.raw().to_string(),
                })
            }
            None => Ok(()),
        }
    }

    /// Reject `ext` tokens this server does not understand.
    pub fn validate_extensions(&self, supported: &[String]) -> Result<(), Error> {
        let unsupported = |exts: Vec<String>| exts.into_iter().find(|e| !supported.contains(e));

        if let Some(ext) = unsupported(self.extensions()) {
            warn!(ext = %ext, "Request applies an unsupported extension");
            return Err(Error::MediaTypeUnsupported { media_type: ext });
        }
        if let Some(ext) = unsupported(self.required_extensions()) {
            warn!(ext = %ext, "Client requires an unsupported extension");
            return Err(Error::MediaTypeUnacceptable { media_type: ext });
        }
        Ok(())
    }

    pub fn validate_query_params(&self) -> Result<(), Error> {
        match self
            .query
            .keys()
            .find(|key| !RECOGNIZED_QUERY_PARAMS.contains(key))
        {
            Some(param) => {
                warn!(param, "Rejecting unrecognized query parameter");
                Err(Error::QueryParamUnrecognized {
                    param: param.to_string(),
                })
            }
            None => Ok(()),
        }
    }

    /// All request-level checks, in the order a binding must run them
    /// before touching the domain.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_content_type_header()?;
        self.validate_accept_header()?;
        self.validate_extensions(&self.config.supported_extensions)?;
        self.validate_query_params()
    }

    // --- sparse fieldsets ---

    fn fields(&self) -> &BTreeMap<String, BTreeSet<String>> {
        self.intent.fields.get_or_init(|| {
            self.query
                .get_nested("fields")
                .map(|fields| {
                    fields
                        .iter()
                        .map(|(resource_type, csv)| {
                            let names = csv
                                .split(',')
                                .map(str::trim)
                                .filter(|f| !f.is_empty())
                                .map(str::to_string)
                                .collect();
                            (resource_type.clone(), names)
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Explicitly requested fields of a type; empty when none were given.
    pub fn included_fields(&self, resource_type: &str) -> Vec<&str> {
        self.fields()
            .get(resource_type)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Without a `fields[type]` entry every field of that type is included.
    pub fn is_included_field(&self, resource_type: &str, field: &str) -> bool {
        match self.fields().get(resource_type) {
            Some(set) => set.contains(field),
            None => true,
        }
    }

    // --- inclusion ---

    fn include_tree(&self) -> Option<&IncludeTree> {
        self.intent
            .include
            .get_or_init(|| self.query.get_str("include").map(IncludeTree::parse))
            .as_ref()
    }

    /// Whether the request carries an `include` parameter at all.
    pub fn has_included_relationships(&self) -> bool {
        self.include_tree().is_some()
    }

    /// Relationship names requested directly below `base_path`.
    pub fn included_relationships(&self, base_path: &str) -> Vec<&str> {
        self.include_tree()
            .and_then(|tree| tree.relationships(base_path))
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether `name` below `base_path` must be included.
    ///
    /// `defaults` apply only at the top level and only when the request has
    /// no `include` parameter.
    pub fn is_included_relationship(&self, base_path: &str, name: &str, defaults: &[&str]) -> bool {
        match self.include_tree() {
            Some(tree) => tree.contains(base_path, name),
            None => base_path.is_empty() && defaults.contains(&name),
        }
    }

    // --- sorting, pagination, filtering ---

    /// Raw `sort` tokens in request order.
    pub fn sorting(&self) -> &[String] {
        self.intent
            .sorting
            .get_or_init(|| self.query.get_str("sort").map(parse_sort).unwrap_or_default())
    }

    pub fn sort_fields(&self) -> Vec<SortField> {
        self.sorting().iter().map(|t| SortField::parse(t)).collect()
    }

    /// The raw `page[...]` mapping.
    pub fn pagination(&self) -> &BTreeMap<String, String> {
        self.intent
            .pagination
            .get_or_init(|| self.query.get_nested(PAGE_PARAM).cloned().unwrap_or_default())
    }

    pub fn page_based_pagination(&self) -> PagePagination {
        PagePagination::from_params(
            self.pagination(),
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    pub fn offset_based_pagination(&self) -> OffsetPagination {
        OffsetPagination::from_params(
            self.pagination(),
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    pub fn cursor_based_pagination(&self) -> CursorPagination {
        CursorPagination::from_params(self.pagination())
    }

    /// The raw `filter[...]` mapping; its semantics belong to the application.
    pub fn filtering(&self) -> &BTreeMap<String, String> {
        self.intent
            .filtering
            .get_or_init(|| self.query.get_nested("filter").cloned().unwrap_or_default())
    }

    // --- body ---

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// The primary `data` member of the request document.
    pub fn body_data(&self) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get("data"))
    }

    pub fn body_data_type(&self) -> Option<&str> {
        self.body_data().and_then(|d| d.get("type")).and_then(Value::as_str)
    }

    pub fn body_data_id(&self) -> Option<&str> {
        self.body_data().and_then(|d| d.get("id")).and_then(Value::as_str)
    }
}
