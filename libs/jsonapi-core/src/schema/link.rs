use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Meta;

/// A single link: either a bare URL or a link object with meta.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Link {
    Href(String),
    Object {
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<Meta>,
    },
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Link::Href(href.into())
    }

    pub fn with_meta(href: impl Into<String>, meta: Meta) -> Self {
        Link::Object {
            href: href.into(),
            meta: Some(meta),
        }
    }

    pub fn href(&self) -> &str {
        match self {
            Link::Href(href) | Link::Object { href, .. } => href,
        }
    }

    fn prefixed(self, base_uri: &str) -> Self {
        if base_uri.is_empty() {
            return self;
        }
        match self {
            Link::Href(href) => Link::Href(format!("{base_uri}{href}")),
            Link::Object { href, meta } => Link::Object {
                href: format!("{base_uri}{href}"),
                meta,
            },
        }
    }
}

/// A `links` member. Relative hrefs are prefixed with the base URI at insertion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links {
    #[serde(skip)]
    base_uri: String,
    links: BTreeMap<String, Link>,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_uri(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            links: BTreeMap::new(),
        }
    }

    pub fn with_link(mut self, name: impl Into<String>, link: Link) -> Self {
        self.insert(name, link);
        self
    }

    pub fn with_self(self, href: impl Into<String>) -> Self {
        self.with_link("self", Link::new(href))
    }

    pub fn with_related(self, href: impl Into<String>) -> Self {
        self.with_link("related", Link::new(href))
    }

    pub fn insert(&mut self, name: impl Into<String>, link: Link) {
        self.links.insert(name.into(), link.prefixed(&self.base_uri));
    }

    pub fn get(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Link)> {
        self.links.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_uri_prefixes_hrefs() {
        let links = Links::with_base_uri("https://example.com")
            .with_self("/books/1")
            .with_related("/books/1/authors");

        assert_eq!(links.get("self").map(Link::href), Some("https://example.com/books/1"));
        assert_eq!(
            serde_json::to_value(&links).unwrap(),
            json!({
                "self": "https://example.com/books/1",
                "related": "https://example.com/books/1/authors"
            })
        );
    }

    #[test]
    fn link_object_keeps_meta() {
        let mut meta = Meta::new();
        meta.insert("count".into(), json!(3));
        let links = Links::new().with_link("related", Link::with_meta("/authors", meta));

        assert_eq!(
            serde_json::to_value(&links).unwrap(),
            json!({ "related": { "href": "/authors", "meta": { "count": 3 } } })
        );
    }
}
