pub mod error;
pub mod handlers;
pub mod hydrator;
pub mod routes;
pub mod transformers;
