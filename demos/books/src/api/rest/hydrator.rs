use chrono::NaiveDate;
use jsonapi_core::{Error, Hydrator, JsonApiRequest, RelationshipPayload};
use serde_json::{Map, Value};

use crate::api::rest::transformers::{AUTHORS, BOOKS, PUBLISHERS};
use crate::domain::error::DomainError;
use crate::domain::model::Book;
use crate::domain::service::Service;

/// Maps `books` write documents onto [`Book`].
///
/// Client-generated ids are accepted when they are not taken yet.
pub struct BookHydrator {
    service: Service,
}

impl BookHydrator {
    pub fn new(service: Service) -> Self {
        Self { service }
    }
}

fn expect_type(name: &str, given: &str, expected: &str) -> Result<(), Error> {
    if given == expected {
        Ok(())
    } else {
        Err(Error::ResourceTypeUnacceptable {
            given: given.to_string(),
            accepted: vec![format!("{expected} (relationship '{name}')")],
        })
    }
}

impl Hydrator<Book> for BookHydrator {
    fn accepted_types(&self) -> &[&str] {
        &[BOOKS]
    }

    fn validate_client_generated_id(&self, id: &str, _request: &JsonApiRequest) -> Result<(), Error> {
        match self.service.get_book(id) {
            Ok(_) => Err(Error::ClientGeneratedIdAlreadyExists { id: id.to_string() }),
            Err(DomainError::BookNotFound { .. }) => Ok(()),
            Err(e) => Err(Error::domain(e)),
        }
    }

    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn set_id(&self, book: &mut Book, id: &str) {
        book.id = id.to_string();
    }

    fn hydrate_attributes(&self, book: &mut Book, attributes: &Map<String, Value>) -> Result<(), Error> {
        if let Some(title) = attributes.get("title") {
            book.title = title
                .as_str()
                .ok_or_else(|| Error::domain(DomainError::validation("title", "must be a string")))?
                .to_string();
        }
        if let Some(pages) = attributes.get("pages") {
            book.pages = pages
                .as_u64()
                .and_then(|p| u32::try_from(p).ok())
                .ok_or_else(|| Error::domain(DomainError::validation("pages", "must be a positive integer")))?;
        }
        if let Some(published_on) = attributes.get("publishedOn") {
            book.published_on = match published_on {
                Value::Null => None,
                Value::String(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    Error::domain(DomainError::validation("publishedOn", "must be a date in YYYY-MM-DD format"))
                })?),
                _ => return Err(Error::domain(DomainError::validation("publishedOn", "must be a string"))),
            };
        }
        Ok(())
    }

    fn hydrate_relationship(&self, book: &mut Book, name: &str, relationship: RelationshipPayload) -> Result<(), Error> {
        match name {
            "authors" => {
                let authors = relationship.into_to_many(name)?;
                for identifier in &authors.identifiers {
                    expect_type(name, &identifier.resource_type, AUTHORS)?;
                }
                book.author_ids = authors.identifiers.into_iter().map(|i| i.id).collect();
            }
            "publisher" => {
                let publisher = relationship.into_to_one(name)?;
                if let Some(identifier) = &publisher.identifier {
                    expect_type(name, &identifier.resource_type, PUBLISHERS)?;
                }
                book.publisher_id = publisher.identifier.map(|i| i.id);
            }
            _ => {}
        }
        Ok(())
    }
}
