use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Attributes, Links, Meta};

/// The minimal `{type, id}` reference to a resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl ResourceIdentifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Parse a linkage object from a request payload.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let resource_type = object.get("type")?.as_str()?;
        let id = object.get("id")?.as_str()?;
        let meta = object.get("meta").and_then(|m| m.as_object()).cloned();
        Some(Self {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
            meta,
        })
    }
}

/// Resource linkage of a relationship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    ToMany(Vec<ResourceIdentifier>),
    ToOne(Option<ResourceIdentifier>),
}

impl Linkage {
    pub fn identifiers(&self) -> Vec<&ResourceIdentifier> {
        match self {
            Linkage::ToOne(one) => one.iter().collect(),
            Linkage::ToMany(many) => many.iter().collect(),
        }
    }
}

/// A relationship member of a resource object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Linkage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// A fully rendered resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl ResourceObject {
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(&self.resource_type, &self.id)
    }
}

/// Top-level `data` member.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData {
    /// Single resource; `None` renders as `null`.
    Resource(Option<Box<ResourceObject>>),
    Collection(Vec<ResourceObject>),
    /// Identifier linkage of a relationship document.
    Relationship(Linkage),
}

impl PrimaryData {
    /// Whether `data` carries no resource at all (`null` or `[]`).
    pub fn is_empty(&self) -> bool {
        match self {
            PrimaryData::Resource(r) => r.is_none(),
            PrimaryData::Collection(c) => c.is_empty(),
            PrimaryData::Relationship(l) => l.identifiers().is_empty(),
        }
    }
}
