use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::api::rest::handlers;
use crate::module::BooksState;

pub fn register_routes(router: Router, state: Arc<BooksState>) -> Router {
    router
        // GET /books - List books; POST /books - Create a book
        .route("/books", get(handlers::list_books).post(handlers::create_book))
        // GET /books/{id} - Get a book; PATCH /books/{id} - Update a book
        .route("/books/{id}", get(handlers::get_book).patch(handlers::update_book))
        .route("/books/{id}/relationships/{relationship}", get(handlers::get_relationship))
        .route("/books/{id}/authors", get(handlers::get_book_authors))
        .route("/books/{id}/publisher", get(handlers::get_book_publisher))
        .layer(Extension(state))
}
