//! Books catalogue served over JSON:API.
//!
//! Books have many authors and one publisher; publishers have a
//! representative. The transformer graph is built once when the router is
//! created and shared by every request.

// === MODULE DEFINITION ===
pub mod module;
pub use module::BooksModule;

// === INTERNAL MODULES ===
// Exposed for tests; consumers should only need `BooksModule`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
