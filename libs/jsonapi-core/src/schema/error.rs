use http::StatusCode;
use serde::{Deserialize, Serialize};

use super::{Links, Meta};

/// A JSON:API error object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// HTTP status of this occurrence; serialized as a string.
    #[serde(with = "status_string")]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// Location of the problem in the request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSource {
    /// JSON Pointer into the request document (e.g. "/data/attributes/title").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// Name of the offending query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ErrorSource {
    pub fn pointer(pointer: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.into()),
            parameter: None,
        }
    }

    pub fn parameter(parameter: impl Into<String>) -> Self {
        Self {
            pointer: None,
            parameter: Some(parameter.into()),
        }
    }
}

impl ErrorObject {
    pub fn new(status: StatusCode) -> Self {
        Self {
            id: None,
            status: status.as_u16(),
            code: None,
            title: None,
            detail: None,
            source: None,
            links: None,
            meta: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source(mut self, source: ErrorSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }
}

mod status_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(status: &u16, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(status)
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u16),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_object_builder_pattern() {
        let e = ErrorObject::new(StatusCode::UNPROCESSABLE_ENTITY)
            .with_id("err-1")
            .with_code("VALIDATION")
            .with_title("Validation failed")
            .with_detail("title must not be empty")
            .with_source(ErrorSource::pointer("/data/attributes/title"));

        assert_eq!(
            serde_json::to_value(&e).unwrap(),
            json!({
                "id": "err-1",
                "status": "422",
                "code": "VALIDATION",
                "title": "Validation failed",
                "detail": "title must not be empty",
                "source": { "pointer": "/data/attributes/title" }
            })
        );
    }

    #[test]
    fn status_accepts_string_or_number() {
        let a: ErrorObject = serde_json::from_value(json!({ "status": "404" })).unwrap();
        let b: ErrorObject = serde_json::from_value(json!({ "status": 404 })).unwrap();
        assert_eq!(a.status, 404);
        assert_eq!(a, b);
    }
}
