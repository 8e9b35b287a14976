use crate::domain::model::{Author, Book, Publisher, Representative};

/// Port for the domain layer: the persistence operations the catalogue needs.
/// Synchronous: transformers call it while a document is being built.
pub trait LibraryRepository: Send + Sync {
    fn find_book(&self, id: &str) -> Option<Book>;
    /// All books in insertion order.
    fn list_books(&self) -> Vec<Book>;
    fn book_exists(&self, id: &str) -> bool;
    fn insert_book(&self, book: Book);
    /// Replace an existing book. Returns false if it does not exist.
    fn update_book(&self, book: Book) -> bool;

    fn find_author(&self, id: &str) -> Option<Author>;
    fn find_publisher(&self, id: &str) -> Option<Publisher>;
    fn find_representative(&self, id: &str) -> Option<Representative>;
}
