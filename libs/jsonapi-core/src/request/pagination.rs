//! Pagination strategies over the raw `page[...]` mapping.
//!
//! The request layer stores `page` untouched; an endpoint picks exactly one
//! strategy. Missing or non-numeric values fall back to defaults and sizes
//! are clamped to the configured maximum.

use std::collections::BTreeMap;

use super::query::{QueryParams, QueryValue};
use crate::schema::{Link, Links};

pub const PAGE_PARAM: &str = "page";

fn numeric<T: std::str::FromStr>(params: &BTreeMap<String, String>, key: &str) -> Option<T> {
    params.get(key).and_then(|v| v.trim().parse().ok())
}

fn clamp_size(size: u32, max: u32) -> u32 {
    size.clamp(1, max.max(1))
}

/// Link to the same endpoint with `page[...]` replaced.
fn page_href(base_uri: &str, query: &QueryParams, page: BTreeMap<String, String>) -> String {
    let mut query = query.clone();
    query.set(PAGE_PARAM, QueryValue::Nested(page));
    format!("{base_uri}?{}", query.to_query_string())
}

/// `page[number]` / `page[size]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagePagination {
    pub number: u32,
    pub size: u32,
}

impl PagePagination {
    pub fn from_params(params: &BTreeMap<String, String>, default_size: u32, max_size: u32) -> Self {
        let number = numeric::<u32>(params, "number").filter(|n| *n >= 1).unwrap_or(1);
        let size = numeric::<u32>(params, "size").unwrap_or(default_size);
        Self {
            number,
            size: clamp_size(size, max_size),
        }
    }

    /// Zero-based index of the first item on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.number.saturating_sub(1)) * u64::from(self.size)
    }

    pub fn last_page(&self, total_items: u64) -> u32 {
        let pages = total_items.div_ceil(u64::from(self.size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    fn href(&self, base_uri: &str, query: &QueryParams, number: u32) -> String {
        let page = BTreeMap::from([
            ("number".to_string(), number.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]);
        page_href(base_uri, query, page)
    }

    /// `self`, `first`, `last`, and `prev`/`next` where they exist.
    pub fn links(&self, base_uri: &str, query: &QueryParams, total_items: u64) -> Links {
        let last = self.last_page(total_items);
        let mut links = Links::new()
            .with_link("self", Link::new(self.href(base_uri, query, self.number)))
            .with_link("first", Link::new(self.href(base_uri, query, 1)))
            .with_link("last", Link::new(self.href(base_uri, query, last)));
        if self.number > 1 {
            let prev = (self.number - 1).min(last);
            links.insert("prev", Link::new(self.href(base_uri, query, prev)));
        }
        if self.number < last {
            links.insert("next", Link::new(self.href(base_uri, query, self.number + 1)));
        }
        links
    }
}

/// `page[offset]` / `page[limit]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OffsetPagination {
    pub offset: u64,
    pub limit: u32,
}

impl OffsetPagination {
    pub fn from_params(params: &BTreeMap<String, String>, default_limit: u32, max_limit: u32) -> Self {
        let offset = numeric::<u64>(params, "offset").unwrap_or(0);
        let limit = numeric::<u32>(params, "limit").unwrap_or(default_limit);
        Self {
            offset,
            limit: clamp_size(limit, max_limit),
        }
    }

    fn href(&self, base_uri: &str, query: &QueryParams, offset: u64) -> String {
        let page = BTreeMap::from([
            ("offset".to_string(), offset.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ]);
        page_href(base_uri, query, page)
    }

    pub fn links(&self, base_uri: &str, query: &QueryParams, total_items: u64) -> Links {
        let limit = u64::from(self.limit.max(1));
        let last = total_items.saturating_sub(1) / limit * limit;
        let mut links = Links::new()
            .with_link("self", Link::new(self.href(base_uri, query, self.offset)))
            .with_link("first", Link::new(self.href(base_uri, query, 0)))
            .with_link("last", Link::new(self.href(base_uri, query, last)));
        if self.offset > 0 {
            let prev = self.offset.saturating_sub(limit);
            links.insert("prev", Link::new(self.href(base_uri, query, prev)));
        }
        if self.offset.checked_add(limit).is_some_and(|end| end < total_items) {
            links.insert("next", Link::new(self.href(base_uri, query, self.offset.saturating_add(limit))));
        }
        links
    }
}

/// `page[cursor]`. The cursor is opaque to this layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CursorPagination {
    pub cursor: Option<String>,
}

impl CursorPagination {
    pub fn from_params(params: &BTreeMap<String, String>) -> Self {
        Self {
            cursor: params
                .get("cursor")
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }

    /// `self`, plus `next` when the caller knows the following cursor.
    pub fn links(&self, base_uri: &str, query: &QueryParams, next_cursor: Option<&str>) -> Links {
        let cursor_page = |cursor: Option<&str>| {
            cursor
                .map(|c| BTreeMap::from([("cursor".to_string(), c.to_string())]))
                .unwrap_or_default()
        };
        let mut links = Links::new().with_link(
            "self",
            Link::new(page_href(base_uri, query, cursor_page(self.cursor.as_deref()))),
        );
        if let Some(next) = next_cursor {
            links.insert("next", Link::new(page_href(base_uri, query, cursor_page(Some(next)))));
        }
        links
    }
}
