use serde::{Deserialize, Serialize};

/// Process-wide JSON:API settings, fixed at startup and shared by `Arc`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonApiConfig {
    /// Version advertised in the top-level `jsonapi` object.
    pub version: String,
    /// Page size / limit used when the request does not specify one.
    pub default_page_size: u32,
    /// Upper bound applied to requested page sizes and limits.
    pub max_page_size: u32,
    /// Extension URIs this server understands in the `ext` media type parameter.
    pub supported_extensions: Vec<String>,
}

impl Default for JsonApiConfig {
    fn default() -> Self {
        Self {
            version: "1.1".to_string(),
            default_page_size: 20,
            max_page_size: 100,
            supported_extensions: Vec::new(),
        }
    }
}

impl JsonApiConfig {
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions.iter().any(|e| e == ext)
    }
}
