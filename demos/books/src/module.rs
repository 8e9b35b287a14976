use std::sync::Arc;

use axum::{Extension, Router};
use jsonapi_core::JsonApiConfig;
use tracing::info;

use crate::api::rest::hydrator::BookHydrator;
use crate::api::rest::routes;
use crate::api::rest::transformers::BookTransformer;
use crate::domain::repo::LibraryRepository;
use crate::domain::service::Service;

/// Everything a handler needs, shared by `Arc`.
pub struct BooksState {
    pub service: Service,
    pub books: BookTransformer,
    pub hydrator: BookHydrator,
    /// Prefix for generated links, e.g. `http://127.0.0.1:8087`. May be empty.
    pub base_uri: String,
}

/// The books module: service, transformer graph and HTTP routes.
pub struct BooksModule {
    state: Arc<BooksState>,
}

impl BooksModule {
    pub fn new(repo: Arc<dyn LibraryRepository>, base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into();
        let service = Service::new(repo);
        let state = BooksState {
            books: BookTransformer::new(service.clone(), base_uri.clone()),
            hydrator: BookHydrator::new(service.clone()),
            service,
            base_uri,
        };
        Self { state: Arc::new(state) }
    }

    pub fn state(&self) -> Arc<BooksState> {
        self.state.clone()
    }

    /// Router with the books routes, a JSON:API 404 fallback and the shared
    /// JSON:API configuration.
    pub fn router(&self, config: JsonApiConfig) -> Router {
        info!(base_uri = %self.state.base_uri, "Registering books routes");
        routes::register_routes(Router::new(), self.state.clone())
            .fallback(jsonapi_axum::not_found)
            .layer(Extension(Arc::new(config)))
    }
}
