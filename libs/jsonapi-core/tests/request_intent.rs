use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use jsonapi_core::{media_type, Error, JsonApiRequest, QueryParams};

#[test]
fn media_type_parsing_is_idempotent() {
    let headers = [
        "application/vnd.api+json",
        "application/vnd.api+json; ext=\"https://jsonapi.org/ext/atomic https://example.com/ext\"",
        "text/html;q=0.8;level=1, application/json",
        "multipart/form-data; boundary=\"a;b,c\"",
    ];
    for header in headers {
        for parsed in media_type::parse_header_value(header) {
            let reparsed = media_type::parse_header_value(parsed.raw());
            assert_eq!(reparsed.len(), 1, "{header}");
            assert_eq!(reparsed[0].name(), parsed.name());

            let mut a = parsed.parameters().to_vec();
            let mut b = reparsed[0].parameters().to_vec();
            a.sort();
            b.sort();
            assert_eq!(a, b, "{header}");
        }
    }
}

#[test]
fn only_reserved_query_keys_are_accepted() {
    let reserved = ["fields[books]", "include", "sort", "page[size]", "filter[x]"];
    for key in reserved {
        let query: QueryParams = [(key, "v")].into_iter().collect();
        let request = JsonApiRequest::new(Method::GET, HeaderMap::new(), query, None);
        assert!(request.validate_query_params().is_ok(), "{key}");
    }

    for key in ["q", "Include", "fieldsX", "pages[size]"] {
        let query: QueryParams = [("include", "a"), (key, "v")].into_iter().collect();
        let request = JsonApiRequest::new(Method::GET, HeaderMap::new(), query, None);
        match request.validate_query_params() {
            Err(Error::QueryParamUnrecognized { param }) => {
                assert!(key.starts_with(param.as_str()), "{key} -> {param}")
            }
            other => panic!("{key}: {other:?}"),
        }
    }
}

#[test]
fn include_tree_siblings() {
    let request = JsonApiRequest::get("include=a.b,a.c");
    assert_eq!(request.included_relationships("a"), vec!["b", "c"]);
    assert_eq!(request.included_relationships(""), vec!["a"]);
    assert!(request.is_included_relationship("a", "c", &[]));
    assert!(!request.is_included_relationship("", "b", &[]));
}

#[test]
fn extensions_are_deduplicated_in_order() {
    let mut headers = HeaderMap::new();
    headers.append(
        CONTENT_TYPE,
        HeaderValue::from_static("application/vnd.api+json; ext=\"https://a,https://b,https://a\""),
    );
    headers.append(ACCEPT, HeaderValue::from_static("application/vnd.api+json; ext=\"https://b\""));
    let request = JsonApiRequest::new(Method::POST, headers, QueryParams::new(), None);

    assert_eq!(request.extensions(), vec!["https://a", "https://b"]);
    assert_eq!(request.required_extensions(), vec!["https://b"]);
}

#[test]
fn validate_runs_negotiation_before_query() {
    let request = JsonApiRequest::get("foo=1").with_header(
        CONTENT_TYPE,
        HeaderValue::from_static("application/vnd.api+json; charset=utf-8"),
    );
    assert!(matches!(request.validate(), Err(Error::MediaTypeUnsupported { .. })));
}
