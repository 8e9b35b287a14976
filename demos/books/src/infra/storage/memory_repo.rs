use std::collections::HashMap;

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::domain::model::{Author, Book, Publisher, Representative};
use crate::domain::repo::LibraryRepository;

/// Process-local catalogue. Books are mutable; people and publishers are fixed
/// at construction.
#[derive(Default)]
pub struct InMemoryLibrary {
    books: RwLock<Vec<Book>>,
    authors: HashMap<String, Author>,
    publishers: HashMap<String, Publisher>,
    representatives: HashMap<String, Representative>,
}

impl InMemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: Author) -> Self {
        self.authors.insert(author.id.clone(), author);
        self
    }

    pub fn with_publisher(mut self, publisher: Publisher) -> Self {
        self.publishers.insert(publisher.id.clone(), publisher);
        self
    }

    pub fn with_representative(mut self, representative: Representative) -> Self {
        self.representatives.insert(representative.id.clone(), representative);
        self
    }

    pub fn with_book(self, book: Book) -> Self {
        self.books.write().push(book);
        self
    }

    /// A small catalogue for the demo server and tests.
    pub fn seeded() -> Self {
        Self::new()
            .with_author(author("1", "Frank Herbert"))
            .with_author(author("2", "Ursula K. Le Guin"))
            .with_author(author("3", "Brian Herbert"))
            .with_representative(Representative {
                id: "1".into(),
                name: "Dana Reyes".into(),
                email: "dana@ace.example".into(),
            })
            .with_publisher(Publisher {
                id: "1".into(),
                name: "Ace Books".into(),
                representative_id: Some("1".into()),
            })
            .with_publisher(Publisher {
                id: "2".into(),
                name: "Harper & Row".into(),
                representative_id: None,
            })
            .with_book(book("1", "Dune", 412, "1965-08-01", &["1"], Some("1")))
            .with_book(book("2", "The Left Hand of Darkness", 286, "1969-03-01", &["2"], Some("1")))
            .with_book(book("3", "The Lathe of Heaven", 184, "1971-10-01", &["2"], Some("2")))
            .with_book(book("4", "Dune: House Atreides", 604, "1999-10-05", &["3", "1"], None))
    }
}

fn author(id: &str, name: &str) -> Author {
    Author {
        id: id.into(),
        name: name.into(),
    }
}

fn book(id: &str, title: &str, pages: u32, published_on: &str, authors: &[&str], publisher: Option<&str>) -> Book {
    Book {
        id: id.into(),
        title: title.into(),
        pages,
        published_on: NaiveDate::parse_from_str(published_on, "%Y-%m-%d").ok(),
        author_ids: authors.iter().map(|a| a.to_string()).collect(),
        publisher_id: publisher.map(str::to_string),
    }
}

impl LibraryRepository for InMemoryLibrary {
    fn find_book(&self, id: &str) -> Option<Book> {
        self.books.read().iter().find(|b| b.id == id).cloned()
    }

    fn list_books(&self) -> Vec<Book> {
        self.books.read().clone()
    }

    fn book_exists(&self, id: &str) -> bool {
        self.books.read().iter().any(|b| b.id == id)
    }

    fn insert_book(&self, book: Book) {
        self.books.write().push(book);
    }

    fn update_book(&self, book: Book) -> bool {
        let mut books = self.books.write();
        match books.iter_mut().find(|b| b.id == book.id) {
            Some(slot) => {
                *slot = book;
                true
            }
            None => false,
        }
    }

    fn find_author(&self, id: &str) -> Option<Author> {
        self.authors.get(id).cloned()
    }

    fn find_publisher(&self, id: &str) -> Option<Publisher> {
        self.publishers.get(id).cloned()
    }

    fn find_representative(&self, id: &str) -> Option<Representative> {
        self.representatives.get(id).cloned()
    }
}
