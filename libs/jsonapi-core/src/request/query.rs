use std::collections::BTreeMap;

/// A decoded query parameter value.
///
/// Bracketed keys such as `fields[books]` or `page[size]` are folded into
/// [`QueryValue::Nested`] under their top-level name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Nested(BTreeMap<String, String>),
}

impl QueryValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Single(s) => Some(s),
            QueryValue::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            QueryValue::Nested(map) => Some(map),
            QueryValue::Single(_) => None,
        }
    }
}

/// Query parameters of a request, keyed by top-level name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, QueryValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a raw query string (without the leading `?`).
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.insert(&key, &value);
        }
        params
    }

    /// Insert a decoded pair. Repeated keys overwrite earlier values.
    pub fn insert(&mut self, key: &str, value: &str) {
        match split_bracketed(key) {
            Some((name, sub)) => {
                let entry = self
                    .0
                    .entry(name.to_string())
                    .or_insert_with(|| QueryValue::Nested(BTreeMap::new()));
                if matches!(entry, QueryValue::Single(_)) {
                    *entry = QueryValue::Nested(BTreeMap::new());
                }
                if let QueryValue::Nested(map) = entry {
                    map.insert(sub.to_string(), value.to_string());
                }
            }
            None => {
                self.0
                    .insert(key.to_string(), QueryValue::Single(value.to_string()));
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Replace a whole top-level entry.
    pub fn set(&mut self, name: impl Into<String>, value: QueryValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(QueryValue::as_str)
    }

    pub fn get_nested(&self, name: &str) -> Option<&BTreeMap<String, String>> {
        self.get(name).and_then(QueryValue::as_nested)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode back into a query string; brackets are kept readable.
    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        for (key, value) in &self.0 {
            let key_enc = urlencoding::encode(key);
            match value {
                QueryValue::Single(v) => {
                    pairs.push(format!("{key_enc}={}", urlencoding::encode(v)));
                }
                QueryValue::Nested(map) => {
                    for (sub, v) in map {
                        pairs.push(format!(
                            "{key_enc}[{}]={}",
                            urlencoding::encode(sub),
                            urlencoding::encode(v)
                        ));
                    }
                }
            }
        }
        pairs.join("&")
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k.as_ref(), v.as_ref());
        }
        params
    }
}

/// `name[sub]` -> `(name, sub)`.
fn split_bracketed(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    let inner = key[open + 1..].strip_suffix(']')?;
    if open == 0 || inner.contains('[') {
        return None;
    }
    Some((&key[..open], inner))
}
