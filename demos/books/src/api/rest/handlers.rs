use std::sync::Arc;

use axum::{extract::Path, Extension};
use jsonapi_axum::{ApiError, ApiResult, DocumentResponse, JsonApi};
use jsonapi_core::{Hydrator, Links, Meta, Responder, StaticSections};
use serde_json::json;
use tracing::{error, info};

use crate::domain::error::DomainError;
use crate::domain::model::Book;
use crate::module::BooksState;

type BooksResult<T> = ApiResult<T, DomainError>;

fn domain(e: DomainError) -> ApiError<DomainError> {
    error!("Books request failed: {}", e);
    ApiError::from_domain(e)
}

/// List books, sorted and paginated by `page[number]` / `page[size]`
pub async fn list_books(
    Extension(state): Extension<Arc<BooksState>>,
    JsonApi(request): JsonApi,
) -> BooksResult<DocumentResponse> {
    let page = request.page_based_pagination();
    info!(number = page.number, size = page.size, "Listing books");

    let result = state
        .service
        .list_books(&request.sort_fields(), page.offset(), page.size)
        .map_err(domain)?;

    let mut meta = Meta::new();
    meta.insert("total".into(), json!(result.total));
    let sections = StaticSections::new()
        .with_links(page.links(&format!("{}/books", state.base_uri), request.query_params(), result.total))
        .with_meta(meta);

    let response = Responder::new(&request).ok_collection(&sections, &result.items, &state.books)?;
    Ok(response.into())
}

/// Get a specific book by ID
pub async fn get_book(
    Extension(state): Extension<Arc<BooksState>>,
    Path(id): Path<String>,
    JsonApi(request): JsonApi,
) -> BooksResult<DocumentResponse> {
    info!("Getting book with id: {}", id);

    let book = state.service.get_book(&id).map_err(domain)?;
    let response = Responder::new(&request).ok(&(), Some(&book), &state.books)?;
    Ok(response.into())
}

/// Create a new book
pub async fn create_book(
    Extension(state): Extension<Arc<BooksState>>,
    JsonApi(request): JsonApi,
) -> BooksResult<DocumentResponse> {
    let book = state.hydrator.hydrate_for_create(&request, Book::default())?;
    info!("Creating book: {}", book.id);

    let book = state.service.create_book(book).map_err(domain)?;
    let response = Responder::new(&request).created(&(), &book, &state.books)?;
    Ok(response.into())
}

/// Update an existing book with the attributes and relationships present in the document
pub async fn update_book(
    Extension(state): Extension<Arc<BooksState>>,
    Path(id): Path<String>,
    JsonApi(request): JsonApi,
) -> BooksResult<DocumentResponse> {
    info!("Updating book {}", id);

    if let Some(given) = request.body_data_id() {
        if given != id {
            return Err(domain(DomainError::IdMismatch {
                given: given.to_string(),
                expected: id,
            }));
        }
    }

    let current = state.service.get_book(&id).map_err(domain)?;
    let book = state.hydrator.hydrate_for_update(&request, current)?;
    let book = state.service.update_book(book).map_err(domain)?;

    let response = Responder::new(&request).ok(&(), Some(&book), &state.books)?;
    Ok(response.into())
}

/// Identifier linkage of one relationship of a book
pub async fn get_relationship(
    Extension(state): Extension<Arc<BooksState>>,
    Path((id, relationship)): Path<(String, String)>,
    JsonApi(request): JsonApi,
) -> BooksResult<DocumentResponse> {
    info!("Getting relationship '{}' of book {}", relationship, id);

    let book = state.service.get_book(&id).map_err(domain)?;
    let response = Responder::new(&request)
        .relationship(&relationship)
        .ok(&(), &book, &state.books)?;
    Ok(response.into())
}

/// Authors of a book as full resources
pub async fn get_book_authors(
    Extension(state): Extension<Arc<BooksState>>,
    Path(id): Path<String>,
    JsonApi(request): JsonApi,
) -> BooksResult<DocumentResponse> {
    let authors = state.service.book_authors(&id).map_err(domain)?;

    let sections = StaticSections::new()
        .with_links(Links::with_base_uri(&state.base_uri).with_self(format!("/books/{id}/authors")));
    let response = Responder::new(&request).ok_collection(&sections, &authors, state.books.authors())?;
    Ok(response.into())
}

/// Publisher of a book, `null` when it has none
pub async fn get_book_publisher(
    Extension(state): Extension<Arc<BooksState>>,
    Path(id): Path<String>,
    JsonApi(request): JsonApi,
) -> BooksResult<DocumentResponse> {
    let book = state.service.get_book(&id).map_err(domain)?;
    let publisher = state.service.publisher_of(&book).map_err(domain)?;

    let sections = StaticSections::new()
        .with_links(Links::with_base_uri(&state.base_uri).with_self(format!("/books/{id}/publisher")));
    let response = Responder::new(&request).ok(&sections, publisher.as_ref(), state.books.publishers())?;
    Ok(response.into())
}
