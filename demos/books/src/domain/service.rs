use std::cmp::Ordering;
use std::sync::Arc;

use jsonapi_core::SortField;
use tracing::{debug, info, instrument};

use crate::domain::error::DomainError;
use crate::domain::model::{Author, Book, Publisher, Representative};
use crate::domain::repo::LibraryRepository;

/// Fields `GET /books` can be sorted by.
pub const SORTABLE_FIELDS: &[&str] = &["id", "title", "pages", "publishedOn"];

/// One page of books plus the size of the whole collection.
#[derive(Debug, Clone)]
pub struct BookPage {
    pub items: Vec<Book>,
    pub total: u64,
}

/// Domain service with the catalogue rules.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn LibraryRepository>,
}

impl Service {
    pub fn new(repo: Arc<dyn LibraryRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "books.service.get_book", skip(self))]
    pub fn get_book(&self, id: &str) -> Result<Book, DomainError> {
        debug!("Getting book by id");
        self.repo.find_book(id).ok_or_else(|| DomainError::book_not_found(id))
    }

    #[instrument(name = "books.service.list_books", skip(self, sort))]
    pub fn list_books(&self, sort: &[SortField], offset: u64, limit: u32) -> Result<BookPage, DomainError> {
        if let Some(unknown) = sort.iter().find(|s| !SORTABLE_FIELDS.contains(&s.field.as_str())) {
            return Err(DomainError::UnsupportedSort {
                field: unknown.field.clone(),
            });
        }

        let mut books = self.repo.list_books();
        books.sort_by(|a, b| {
            sort.iter()
                .map(|s| {
                    let ord = compare_by(a, b, &s.field);
                    if s.is_descending() {
                        ord.reverse()
                    } else {
                        ord
                    }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        let total = books.len() as u64;
        let items: Vec<Book> = books
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .collect();
        debug!("Listed {} of {} books", items.len(), total);
        Ok(BookPage { items, total })
    }

    #[instrument(name = "books.service.create_book", skip(self, book), fields(book_id = %book.id))]
    pub fn create_book(&self, book: Book) -> Result<Book, DomainError> {
        info!("Creating new book");
        if self.repo.book_exists(&book.id) {
            return Err(DomainError::BookAlreadyExists { id: book.id });
        }
        self.validate(&book)?;
        self.repo.insert_book(book.clone());
        info!("Successfully created book");
        Ok(book)
    }

    #[instrument(name = "books.service.update_book", skip(self, book), fields(book_id = %book.id))]
    pub fn update_book(&self, book: Book) -> Result<Book, DomainError> {
        info!("Updating book");
        self.validate(&book)?;
        if !self.repo.update_book(book.clone()) {
            return Err(DomainError::book_not_found(&book.id));
        }
        Ok(book)
    }

    pub fn book_authors(&self, id: &str) -> Result<Vec<Author>, DomainError> {
        let book = self.get_book(id)?;
        self.authors_of(&book)
    }

    /// Authors in the order the book lists them.
    pub fn authors_of(&self, book: &Book) -> Result<Vec<Author>, DomainError> {
        book.author_ids
            .iter()
            .map(|id| self.repo.find_author(id).ok_or_else(|| DomainError::author_not_found(id)))
            .collect()
    }

    pub fn publisher_of(&self, book: &Book) -> Result<Option<Publisher>, DomainError> {
        book.publisher_id
            .as_deref()
            .map(|id| self.repo.find_publisher(id).ok_or_else(|| DomainError::publisher_not_found(id)))
            .transpose()
    }

    pub fn representative_of(&self, publisher: &Publisher) -> Option<Representative> {
        publisher
            .representative_id
            .as_deref()
            .and_then(|id| self.repo.find_representative(id))
    }

    // --- validation helpers ---

    fn validate(&self, book: &Book) -> Result<(), DomainError> {
        if book.title.trim().is_empty() {
            return Err(DomainError::validation("title", "must not be empty"));
        }
        if let Some(missing) = book.author_ids.iter().find(|id| self.repo.find_author(id).is_none()) {
            return Err(DomainError::author_not_found(missing));
        }
        if let Some(id) = book.publisher_id.as_deref() {
            if self.repo.find_publisher(id).is_none() {
                return Err(DomainError::publisher_not_found(id));
            }
        }
        Ok(())
    }
}

fn compare_by(a: &Book, b: &Book, field: &str) -> Ordering {
    match field {
        "id" => a.id.cmp(&b.id),
        "title" => a.title.cmp(&b.title),
        "pages" => a.pages.cmp(&b.pages),
        "publishedOn" => a.published_on.cmp(&b.published_on),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::InMemoryLibrary;

    fn service() -> Service {
        Service::new(Arc::new(InMemoryLibrary::seeded()))
    }

    fn sort(raw: &str) -> Vec<SortField> {
        raw.split(',').map(SortField::parse).collect()
    }

    #[test]
    fn list_sorts_by_multiple_keys() {
        let page = service().list_books(&sort("-pages,title"), 0, 10).unwrap();
        let pages: Vec<u32> = page.items.iter().map(|b| b.pages).collect();
        let mut expected = pages.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(pages, expected);
        assert_eq!(page.total, page.items.len() as u64);
    }

    #[test]
    fn list_rejects_unknown_sort_field() {
        let err = service().list_books(&sort("isbn"), 0, 10).unwrap_err();
        assert_eq!(err, DomainError::UnsupportedSort { field: "isbn".into() });
    }

    #[test]
    fn list_applies_offset_and_limit() {
        let svc = service();
        let all = svc.list_books(&sort("id"), 0, 100).unwrap();
        let page = svc.list_books(&sort("id"), 1, 1).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0], all.items[1]);
        assert_eq!(page.total, all.total);
    }

    #[test]
    fn create_checks_references() {
        let book = Book {
            id: "x".into(),
            title: "Orphan".into(),
            author_ids: vec!["nobody".into()],
            ..Book::default()
        };
        assert_eq!(
            service().create_book(book).unwrap_err(),
            DomainError::author_not_found("nobody")
        );
    }

    #[test]
    fn create_rejects_duplicate_id() {
        let svc = service();
        let existing = svc.list_books(&[], 0, 1).unwrap().items.remove(0);
        assert!(matches!(
            svc.create_book(existing),
            Err(DomainError::BookAlreadyExists { .. })
        ));
    }

    #[test]
    fn update_requires_existing_book() {
        let book = Book {
            id: "missing".into(),
            title: "Ghost".into(),
            ..Book::default()
        };
        assert_eq!(
            service().update_book(book).unwrap_err(),
            DomainError::book_not_found("missing")
        );
    }
}
