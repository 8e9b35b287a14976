//! Wire-level building blocks of a JSON:API document.

mod error;
mod link;
mod resource;

pub use self::error::{ErrorObject, ErrorSource};
pub use self::link::{Link, Links};
pub use self::resource::{Linkage, PrimaryData, RelationshipObject, ResourceIdentifier, ResourceObject};

use serde::{Deserialize, Serialize};

/// Free-form `meta` member.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// `attributes` member of a resource object.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Top-level `jsonapi` object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonApiObject {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl JsonApiObject {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}
