use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use books::infra::storage::InMemoryLibrary;
use books::BooksModule;
use jsonapi_core::JsonApiConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    BooksModule::new(Arc::new(InMemoryLibrary::seeded()), "").router(JsonApiConfig::default())
}

struct TestResponse {
    status: StatusCode,
    location: Option<String>,
    body: Value,
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    TestResponse { status, location, body }
}

async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn write(app: &Router, method: &str, uri: &str, body: Value) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/vnd.api+json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn ids(values: &Value) -> Vec<&str> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn list_includes_default_authors_once() {
    let app = app();
    let resp = get(&app, "/books").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(ids(&resp.body["data"]), vec!["1", "2", "3", "4"]);
    assert_eq!(resp.body["meta"]["total"], 4);
    assert_eq!(ids(&resp.body["included"]), vec!["1", "2", "3"]);
    assert!(resp.body["links"]["first"].is_string());
    assert!(resp.body["links"].get("next").is_none());

    // publisher linkage is present even though it is not included
    let dune = &resp.body["data"][0];
    assert_eq!(
        dune["relationships"]["publisher"]["data"],
        json!({ "type": "publishers", "id": "1" })
    );
    assert_eq!(dune["relationships"]["authors"]["meta"]["count"], 1);
}

#[tokio::test]
async fn list_sorts_and_paginates() {
    let app = app();
    let resp = get(&app, "/books?sort=-pages&page%5Bnumber%5D=2&page%5Bsize%5D=2&include=").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(ids(&resp.body["data"]), vec!["2", "3"]);
    assert!(resp.body.get("included").is_none());

    let links = &resp.body["links"];
    assert!(links["prev"].as_str().unwrap().contains("page[number]=1"));
    assert!(links["last"].as_str().unwrap().contains("page[number]=2"));
    assert!(links["self"].as_str().unwrap().contains("sort=-pages"));
    assert!(links.get("next").is_none());
}

#[tokio::test]
async fn unsupported_sort_field_is_bad_request() {
    let resp = get(&app(), "/books?sort=isbn").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["errors"][0]["code"], "SORTING_UNSUPPORTED");
    assert_eq!(resp.body["errors"][0]["source"]["parameter"], "sort");
}

#[tokio::test]
async fn unknown_include_path_is_bad_request() {
    let resp = get(&app(), "/books/1?include=publisher.headquarters").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["errors"][0]["code"], "INCLUSION_UNSUPPORTED");
    assert_eq!(resp.body["errors"][0]["source"]["parameter"], "include");
    assert!(resp.body.get("data").is_none());
}

#[tokio::test]
async fn nested_include_with_sparse_fieldset() {
    let resp = get(
        &app(),
        "/books/1?include=publisher.representative&fields%5Bbooks%5D=title,publisher",
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    let data = &resp.body["data"];
    assert_eq!(data["attributes"], json!({ "title": "Dune" }));
    assert!(data["relationships"].get("authors").is_none());
    assert_eq!(data["links"]["self"], "/books/1");

    let included = resp.body["included"].as_array().unwrap();
    assert_eq!(included.len(), 2);
    let publisher = included.iter().find(|r| r["type"] == "publishers").unwrap();
    assert_eq!(
        publisher["relationships"]["representative"]["data"],
        json!({ "type": "representatives", "id": "1" })
    );
    assert!(included.iter().any(|r| r["type"] == "representatives"));
}

#[tokio::test]
async fn representative_linkage_is_omitted_unless_included() {
    let resp = get(&app(), "/books/3?include=publisher").await;

    let publisher = &resp.body["included"][0];
    assert_eq!(publisher["id"], "2");
    let representative = &publisher["relationships"]["representative"];
    assert!(representative.get("data").is_none());
    assert_eq!(representative["links"]["related"], "/publishers/2/representative");
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let resp = get(&app(), "/books/99").await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["errors"][0]["code"], "BOOKS_NOT_FOUND");
}

#[tokio::test]
async fn relationship_endpoint_returns_linkage() {
    let resp = get(&app(), "/books/4/relationships/authors").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.body["data"],
        json!([
            { "type": "authors", "id": "3" },
            { "type": "authors", "id": "1" }
        ])
    );
    assert_eq!(resp.body["links"]["self"], "/books/4/relationships/authors");
    assert!(resp.body["data"][0].get("attributes").is_none());
}

#[tokio::test]
async fn unknown_relationship_is_not_found() {
    let resp = get(&app(), "/books/1/relationships/reviews").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn related_endpoints_return_full_resources() {
    let app = app();

    let authors = get(&app, "/books/4/authors").await;
    assert_eq!(authors.status, StatusCode::OK);
    assert_eq!(ids(&authors.body["data"]), vec!["3", "1"]);
    assert_eq!(authors.body["data"][0]["attributes"]["name"], "Brian Herbert");
    assert_eq!(authors.body["links"]["self"], "/books/4/authors");

    let publisher = get(&app, "/books/2/publisher").await;
    assert_eq!(publisher.body["data"]["type"], "publishers");
    assert_eq!(publisher.body["data"]["attributes"]["name"], "Ace Books");

    let none = get(&app, "/books/4/publisher").await;
    assert_eq!(none.status, StatusCode::OK);
    assert_eq!(none.body["data"], Value::Null);
}

#[tokio::test]
async fn create_returns_location_and_is_readable() {
    let app = app();
    let resp = write(
        &app,
        "POST",
        "/books",
        json!({
            "data": {
                "type": "books",
                "attributes": { "title": "The Dispossessed", "pages": 387 },
                "relationships": {
                    "authors": { "data": [{ "type": "authors", "id": "2" }] },
                    "publisher": { "data": { "type": "publishers", "id": "2" } }
                }
            }
        }),
    )
    .await;

    assert_eq!(resp.status, StatusCode::CREATED);
    let id = resp.body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(resp.location.as_deref(), Some(format!("/books/{id}").as_str()));
    assert_eq!(resp.body["data"]["attributes"]["title"], "The Dispossessed");
    assert_eq!(ids(&resp.body["included"]), vec!["2"]);

    let fetched = get(&app, &format!("/books/{id}?include=")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["attributes"]["pages"], 387);
}

#[tokio::test]
async fn create_with_taken_client_id_is_conflict() {
    let resp = write(
        &app(),
        "POST",
        "/books",
        json!({ "data": { "type": "books", "id": "1", "attributes": { "title": "Copy" } } }),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_with_wrong_type_is_conflict() {
    let resp = write(
        &app(),
        "POST",
        "/books",
        json!({ "data": { "type": "authors", "attributes": { "name": "Anon" } } }),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["errors"][0]["source"]["pointer"], "/data/type");
}

#[tokio::test]
async fn create_with_unknown_author_is_not_found() {
    let resp = write(
        &app(),
        "POST",
        "/books",
        json!({
            "data": {
                "type": "books",
                "attributes": { "title": "Lost" },
                "relationships": { "authors": { "data": [{ "type": "authors", "id": "42" }] } }
            }
        }),
    )
    .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["errors"][0]["code"], "BOOKS_RELATED_NOT_FOUND");
}

#[tokio::test]
async fn invalid_attribute_is_domain_validation_error() {
    let resp = write(
        &app(),
        "POST",
        "/books",
        json!({ "data": { "type": "books", "attributes": { "title": 5 } } }),
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["errors"][0]["source"]["pointer"], "/data/attributes/title");
}

#[tokio::test]
async fn update_changes_only_given_members() {
    let app = app();
    let resp = write(
        &app,
        "PATCH",
        "/books/2",
        json!({ "data": { "type": "books", "id": "2", "attributes": { "title": "LHoD" } } }),
    )
    .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["attributes"]["title"], "LHoD");
    assert_eq!(resp.body["data"]["attributes"]["pages"], 286);

    let fetched = get(&app, "/books/2").await;
    assert_eq!(fetched.body["data"]["attributes"]["title"], "LHoD");
}

#[tokio::test]
async fn update_with_mismatched_id_is_conflict() {
    let resp = write(
        &app(),
        "PATCH",
        "/books/2",
        json!({ "data": { "type": "books", "id": "3", "attributes": {} } }),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["errors"][0]["code"], "BOOKS_ID_MISMATCH");
}

#[tokio::test]
async fn update_with_wrong_cardinality_is_conflict() {
    let resp = write(
        &app(),
        "PATCH",
        "/books/2",
        json!({
            "data": {
                "type": "books",
                "id": "2",
                "relationships": { "authors": { "data": { "type": "authors", "id": "1" } } }
            }
        }),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn update_without_id_is_rejected() {
    let resp = write(
        &app(),
        "PATCH",
        "/books/2",
        json!({ "data": { "type": "books", "attributes": { "title": "x" } } }),
    )
    .await;
    assert_eq!(resp.status.as_u16() / 100, 4);
    assert!(resp.body.get("data").is_none());
}

#[tokio::test]
async fn published_on_is_a_calendar_date() {
    let app = app();
    let dune = get(&app, "/books/1?include=").await;
    assert_eq!(dune.body["data"]["attributes"]["publishedOn"], "1965-08-01");

    let resp = write(
        &app,
        "PATCH",
        "/books/1",
        json!({ "data": { "type": "books", "id": "1", "attributes": { "publishedOn": "1965-13-40" } } }),
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(resp.body["errors"][0]["source"]["pointer"], "/data/attributes/publishedOn");
}
