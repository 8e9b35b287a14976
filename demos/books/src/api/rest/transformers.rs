//! Transformer graph: Book → {Author, Publisher → Representative}.

use jsonapi_core::{Attributes, BoundResource, Error, Links, Meta, Relationship, ResourceTransformer};
use serde_json::json;

use crate::domain::model::{Author, Book, Publisher, Representative};
use crate::domain::service::Service;

pub const BOOKS: &str = "books";
pub const AUTHORS: &str = "authors";
pub const PUBLISHERS: &str = "publishers";
pub const REPRESENTATIVES: &str = "representatives";

pub struct RepresentativeTransformer {
    base_uri: String,
}

impl ResourceTransformer<Representative> for RepresentativeTransformer {
    fn resource_type(&self, _: &Representative) -> String {
        REPRESENTATIVES.into()
    }

    fn id(&self, representative: &Representative) -> String {
        representative.id.clone()
    }

    fn attributes(&self, representative: &Representative) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("name".into(), json!(representative.name));
        attributes.insert("email".into(), json!(representative.email));
        attributes
    }

    fn links(&self, representative: &Representative) -> Option<Links> {
        Some(Links::with_base_uri(&self.base_uri).with_self(format!("/representatives/{}", representative.id)))
    }

    fn relationship<'a>(&'a self, _: &'a Representative, _: &str) -> Result<Option<Relationship<'a>>, Error> {
        Ok(None)
    }
}

pub struct PublisherTransformer {
    service: Service,
    base_uri: String,
    representatives: RepresentativeTransformer,
}

impl ResourceTransformer<Publisher> for PublisherTransformer {
    fn resource_type(&self, _: &Publisher) -> String {
        PUBLISHERS.into()
    }

    fn id(&self, publisher: &Publisher) -> String {
        publisher.id.clone()
    }

    fn attributes(&self, publisher: &Publisher) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("name".into(), json!(publisher.name));
        attributes
    }

    fn links(&self, publisher: &Publisher) -> Option<Links> {
        Some(Links::with_base_uri(&self.base_uri).with_self(format!("/publishers/{}", publisher.id)))
    }

    fn relationship_names(&self) -> &'static [&'static str] {
        &["representative"]
    }

    fn relationship<'a>(&'a self, publisher: &'a Publisher, name: &str) -> Result<Option<Relationship<'a>>, Error> {
        match name {
            "representative" => {
                let representative = self
                    .service
                    .representative_of(publisher)
                    .map(|r| BoundResource::owned(r, &self.representatives));
                let links = Links::with_base_uri(&self.base_uri)
                    .with_related(format!("/publishers/{}/representative", publisher.id));
                Ok(Some(
                    Relationship::to_one(representative)
                        .with_links(links)
                        .omit_data_when_not_included(),
                ))
            }
            _ => Ok(None),
        }
    }
}

pub struct AuthorTransformer {
    base_uri: String,
}

impl ResourceTransformer<Author> for AuthorTransformer {
    fn resource_type(&self, _: &Author) -> String {
        AUTHORS.into()
    }

    fn id(&self, author: &Author) -> String {
        author.id.clone()
    }

    fn attributes(&self, author: &Author) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("name".into(), json!(author.name));
        attributes
    }

    fn links(&self, author: &Author) -> Option<Links> {
        Some(Links::with_base_uri(&self.base_uri).with_self(format!("/authors/{}", author.id)))
    }

    fn relationship<'a>(&'a self, _: &'a Author, _: &str) -> Result<Option<Relationship<'a>>, Error> {
        Ok(None)
    }
}

/// Root of the graph, built once per router.
pub struct BookTransformer {
    service: Service,
    base_uri: String,
    authors: AuthorTransformer,
    publishers: PublisherTransformer,
}

impl BookTransformer {
    pub fn new(service: Service, base_uri: impl Into<String>) -> Self {
        let base_uri = base_uri.into();
        Self {
            authors: AuthorTransformer {
                base_uri: base_uri.clone(),
            },
            publishers: PublisherTransformer {
                service: service.clone(),
                base_uri: base_uri.clone(),
                representatives: RepresentativeTransformer {
                    base_uri: base_uri.clone(),
                },
            },
            service,
            base_uri,
        }
    }

    pub fn authors(&self) -> &AuthorTransformer {
        &self.authors
    }

    pub fn publishers(&self) -> &PublisherTransformer {
        &self.publishers
    }

    fn relationship_links(&self, book: &Book, name: &str) -> Links {
        Links::with_base_uri(&self.base_uri)
            .with_self(format!("/books/{}/relationships/{name}", book.id))
            .with_related(format!("/books/{}/{name}", book.id))
    }
}

impl ResourceTransformer<Book> for BookTransformer {
    fn resource_type(&self, _: &Book) -> String {
        BOOKS.into()
    }

    fn id(&self, book: &Book) -> String {
        book.id.clone()
    }

    fn attributes(&self, book: &Book) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("title".into(), json!(book.title));
        attributes.insert("pages".into(), json!(book.pages));
        attributes.insert("publishedOn".into(), json!(book.published_on.map(|d| d.format("%Y-%m-%d").to_string())));
        attributes
    }

    fn links(&self, book: &Book) -> Option<Links> {
        Some(Links::with_base_uri(&self.base_uri).with_self(format!("/books/{}", book.id)))
    }

    fn relationship_names(&self) -> &'static [&'static str] {
        &["authors", "publisher"]
    }

    fn default_included_relationships(&self) -> &'static [&'static str] {
        &["authors"]
    }

    fn relationship<'a>(&'a self, book: &'a Book, name: &str) -> Result<Option<Relationship<'a>>, Error> {
        match name {
            "authors" => {
                let authors = self.service.authors_of(book).map_err(Error::domain)?;
                let mut meta = Meta::new();
                meta.insert("count".into(), json!(authors.len()));
                Ok(Some(
                    Relationship::to_many(authors.into_iter().map(|a| BoundResource::owned(a, &self.authors)))
                        .with_links(self.relationship_links(book, name))
                        .with_meta(meta),
                ))
            }
            "publisher" => {
                let publisher = self.service.publisher_of(book).map_err(Error::domain)?;
                Ok(Some(
                    Relationship::to_one(publisher.map(|p| BoundResource::owned(p, &self.publishers)))
                        .with_links(self.relationship_links(book, name)),
                ))
            }
            _ => Ok(None),
        }
    }
}
