use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Book not found: {id}")]
    BookNotFound { id: String },

    #[error("Author not found: {id}")]
    AuthorNotFound { id: String },

    #[error("Publisher not found: {id}")]
    PublisherNotFound { id: String },

    #[error("Book already exists: {id}")]
    BookAlreadyExists { id: String },

    #[error("Document id '{given}' does not match the addressed book '{expected}'")]
    IdMismatch { given: String, expected: String },

    #[error("Books cannot be sorted by '{field}'")]
    UnsupportedSort { field: String },

    #[error("Validation error on '{field}': {message}")]
    Validation { field: String, message: String },
}

impl DomainError {
    pub fn book_not_found(id: impl Into<String>) -> Self {
        Self::BookNotFound { id: id.into() }
    }

    pub fn author_not_found(id: impl Into<String>) -> Self {
        Self::AuthorNotFound { id: id.into() }
    }

    pub fn publisher_not_found(id: impl Into<String>) -> Self {
        Self::PublisherNotFound { id: id.into() }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
