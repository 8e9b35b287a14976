//! Media-type negotiation for `Content-Type` and `Accept` headers.
//!
//! A header value may list several media types separated by `,`, each with
//! `;`-separated parameters. Parameter values may be quoted, in which case the
//! quotes are stripped and delimiters inside them are not significant:
//!
//! ```text
//! application/vnd.api+json; ext="https://jsonapi.org/ext/atomic,bulk", text/html;q=0.8
//! ```
//!
//! The negotiator never fails; callers decide whether a finding is an error.

/// The JSON:API media type.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// The only media type parameter JSON:API allows.
pub const EXT_PARAMETER: &str = "ext";

/// One parsed media type entry of a header value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaType {
    name: String,
    parameters: Vec<(String, String)>,
    raw: String,
}

impl MediaType {
    /// `type/subtype` token as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in header order, values unquoted.
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The trimmed source text of this entry.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_json_api(&self) -> bool {
        self.name.eq_ignore_ascii_case(JSON_API_MEDIA_TYPE)
    }
}

/// Parse every media type found in the given header values.
pub fn parse<I, S>(header_values: I) -> Vec<MediaType>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    header_values
        .into_iter()
        .flat_map(|value| parse_header_value(value.as_ref()))
        .collect()
}

/// Parse one header value into its media type entries.
pub fn parse_header_value(value: &str) -> Vec<MediaType> {
    split_unquoted(value, ',')
        .into_iter()
        .filter_map(parse_entry)
        .collect()
}

fn parse_entry(entry: &str) -> Option<MediaType> {
    let raw = entry.trim();
    if raw.is_empty() {
        return None;
    }

    let mut pieces = split_unquoted(raw, ';').into_iter();
    let name = pieces.next()?.trim();
    if name.is_empty() {
        return None;
    }

    let parameters = pieces
        .filter_map(|piece| {
            let piece = piece.trim();
            if piece.is_empty() {
                return None;
            }
            let (key, value) = match piece.split_once('=') {
                Some((k, v)) => (k.trim(), unquote(v)),
                None => (piece, String::new()),
            };
            Some((key.to_string(), value))
        })
        .collect();

    Some(MediaType {
        name: name.to_string(),
        parameters,
        raw: raw.to_string(),
    })
}

/// Extension URIs requested through the `ext` parameter of JSON:API media
/// types, de-duplicated in first-seen order.
pub fn extensions<I, S>(header_values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut found: Vec<String> = Vec::new();
    for media_type in parse(header_values) {
        if !media_type.is_json_api() {
            continue;
        }
        let Some(ext) = media_type.parameter(EXT_PARAMETER) else {
            continue;
        };
        for token in ext.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if !found.iter().any(|f| f == token) {
                found.push(token.to_string());
            }
        }
    }
    found
}

/// First JSON:API media type carrying a parameter other than `ext`.
pub fn find_non_compliant_media_type<I, S>(header_values: I) -> Option<MediaType>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse(header_values).into_iter().find(|media_type| {
        media_type.is_json_api()
            && media_type
                .parameters
                .iter()
                .any(|(name, _)| !name.eq_ignore_ascii_case(EXT_PARAMETER))
    })
}

/// Split on `delimiter` except inside double quotes.
fn split_unquoted(input: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mt: &MediaType) -> Vec<(&str, &str)> {
        let mut p: Vec<_> = mt
            .parameters()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        p.sort();
        p
    }

    #[test]
    fn parses_single_media_type() {
        let parsed = parse_header_value("application/vnd.api+json");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name(), JSON_API_MEDIA_TYPE);
        assert!(parsed[0].parameters().is_empty());
        assert_eq!(parsed[0].raw(), "application/vnd.api+json");
    }

    #[test]
    fn parses_multiple_media_types_with_parameters() {
        let parsed = parse_header_value(
            "text/html;q=0.9 , application/vnd.api+json; ext=bulk, application/json",
        );
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].name(), "text/html");
        assert_eq!(parsed[0].parameter("q"), Some("0.9"));
        assert_eq!(parsed[1].name(), JSON_API_MEDIA_TYPE);
        assert_eq!(parsed[1].parameter("ext"), Some("bulk"));
        assert_eq!(parsed[1].raw(), "application/vnd.api+json; ext=bulk");
        assert_eq!(parsed[2].name(), "application/json");
    }

    #[test]
    fn quoted_values_keep_commas_and_lose_quotes() {
        let parsed = parse_header_value(r#"application/vnd.api+json; ext="bulk,jsonpatch""#);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].parameter("ext"), Some("bulk,jsonpatch"));
    }

    #[test]
    fn unknown_parameters_are_preserved() {
        let parsed = parse_header_value("application/vnd.api+json; charset=utf-8; flag");
        assert_eq!(params(&parsed[0]), vec![("charset", "utf-8"), ("flag", "")]);
    }

    #[test]
    fn empty_entries_are_skipped() {
        assert!(parse_header_value("").is_empty());
        assert_eq!(parse_header_value(" , text/plain ,").len(), 1);
    }

    #[test]
    fn parse_of_raw_is_idempotent() {
        let inputs = [
            "application/vnd.api+json",
            r#"application/vnd.api+json; ext="a,b"; profile=x"#,
            "text/html;level=1;q=0.5",
        ];
        for input in inputs {
            for mt in parse_header_value(input) {
                let again = parse_header_value(mt.raw());
                assert_eq!(again.len(), 1, "{input}");
                assert_eq!(again[0].name(), mt.name());
                assert_eq!(params(&again[0]), params(&mt));
            }
        }
    }

    #[test]
    fn parse_reads_all_header_values() {
        let parsed = parse(["text/html", "application/vnd.api+json, application/json"]);
        let names: Vec<_> = parsed.iter().map(MediaType::name).collect();
        assert_eq!(names, vec!["text/html", JSON_API_MEDIA_TYPE, "application/json"]);
    }

    #[test]
    fn extensions_are_deduplicated_in_order() {
        let ext = extensions([
            r#"application/vnd.api+json; ext="bulk,jsonpatch", application/vnd.api+json; ext=bulk"#,
            r#"application/vnd.api+json; ext="atomic""#,
            "application/json; ext=ignored",
        ]);
        assert_eq!(ext, vec!["bulk", "jsonpatch", "atomic"]);
    }

    #[test]
    fn extensions_empty_without_ext() {
        assert!(extensions(["application/vnd.api+json"]).is_empty());
        assert!(extensions(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn non_compliant_media_type_detected() {
        assert!(find_non_compliant_media_type(["application/vnd.api+json"]).is_none());
        assert!(find_non_compliant_media_type(["application/vnd.api+json; ext=bulk"]).is_none());
        assert!(find_non_compliant_media_type(["text/html; charset=utf-8"]).is_none());

        let bad = find_non_compliant_media_type([
            "application/vnd.api+json; ext=bulk, application/vnd.api+json; version=1",
        ])
        .expect("non-compliant entry");
        assert_eq!(bad.raw(), "application/vnd.api+json; version=1");
    }
}
