//! Resource transformers and the type-erased resources the pipeline walks.
//!
//! A transformer renders one domain type. It holds references (or `Arc`s) to
//! the transformers of its related types, so the whole graph is built once at
//! startup and shared by every request. Whether a relationship is traversed
//! is decided by the document pipeline, never by the transformer.

use crate::error::Error;
use crate::schema::{Attributes, Linkage, Links, Meta, RelationshipObject, ResourceIdentifier};

/// Renders domain objects of type `T` as JSON:API resources.
pub trait ResourceTransformer<T>: Send + Sync {
    fn resource_type(&self, object: &T) -> String;

    fn id(&self, object: &T) -> String;

    /// Every attribute of the object; sparse fieldsets are applied afterwards.
    fn attributes(&self, object: &T) -> Attributes;

    fn meta(&self, _object: &T) -> Option<Meta> {
        None
    }

    fn links(&self, _object: &T) -> Option<Links> {
        None
    }

    /// Names accepted by [`relationship`](Self::relationship), in output order.
    fn relationship_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Relationships included when the request carries no `include` parameter.
    fn default_included_relationships(&self) -> &'static [&'static str] {
        &[]
    }

    /// Resolve one relationship of `object`.
    ///
    /// Only called for relationships that end up in the document, so this is
    /// the place to load related objects lazily. Collaborator failures should
    /// be returned as [`Error::Domain`]. `Ok(None)` drops the relationship.
    fn relationship<'a>(&'a self, object: &'a T, name: &str) -> Result<Option<Relationship<'a>>, Error>;
}

/// Object-safe view of a domain object bound to its transformer.
pub(crate) trait AnyResource {
    fn resource_type(&self) -> String;
    fn id(&self) -> String;
    fn attributes(&self) -> Attributes;
    fn meta(&self) -> Option<Meta>;
    fn links(&self) -> Option<Links>;
    fn relationship_names(&self) -> &'static [&'static str];
    fn default_included_relationships(&self) -> &'static [&'static str];
    fn relationship(&self, name: &str) -> Result<Option<Relationship<'_>>, Error>;
}

enum Held<'a, T> {
    Borrowed(&'a T),
    Owned(T),
}

impl<T> Held<'_, T> {
    fn get(&self) -> &T {
        match self {
            Held::Borrowed(object) => object,
            Held::Owned(object) => object,
        }
    }
}

struct Bound<'a, T, R: ?Sized> {
    object: Held<'a, T>,
    transformer: &'a R,
}

impl<T, R> AnyResource for Bound<'_, T, R>
where
    R: ResourceTransformer<T> + ?Sized,
{
    fn resource_type(&self) -> String {
        self.transformer.resource_type(self.object.get())
    }

    fn id(&self) -> String {
        self.transformer.id(self.object.get())
    }

    fn attributes(&self) -> Attributes {
        self.transformer.attributes(self.object.get())
    }

    fn meta(&self) -> Option<Meta> {
        self.transformer.meta(self.object.get())
    }

    fn links(&self) -> Option<Links> {
        self.transformer.links(self.object.get())
    }

    fn relationship_names(&self) -> &'static [&'static str] {
        self.transformer.relationship_names()
    }

    fn default_included_relationships(&self) -> &'static [&'static str] {
        self.transformer.default_included_relationships()
    }

    fn relationship(&self, name: &str) -> Result<Option<Relationship<'_>>, Error> {
        self.transformer.relationship(self.object.get(), name)
    }
}

/// A domain object paired with the transformer that renders it.
///
/// Collections of `BoundResource` may mix resource types.
pub struct BoundResource<'a>(Box<dyn AnyResource + 'a>);

impl<'a> BoundResource<'a> {
    pub fn new<T, R>(object: &'a T, transformer: &'a R) -> Self
    where
        T: 'a,
        R: ResourceTransformer<T> + ?Sized,
    {
        Self(Box::new(Bound {
            object: Held::Borrowed(object),
            transformer,
        }))
    }

    /// Bind an object loaded on demand, e.g. by a relationship resolver.
    pub fn owned<T, R>(object: T, transformer: &'a R) -> Self
    where
        T: 'a,
        R: ResourceTransformer<T> + ?Sized,
    {
        Self(Box::new(Bound {
            object: Held::Owned(object),
            transformer,
        }))
    }

    pub fn resource_type(&self) -> String {
        self.0.resource_type()
    }

    pub fn id(&self) -> String {
        self.0.id()
    }

    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.0.resource_type(), self.0.id())
    }

    pub(crate) fn inner(&self) -> &(dyn AnyResource + 'a) {
        self.0.as_ref()
    }
}

impl std::fmt::Debug for BoundResource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundResource")
            .field("type", &self.0.resource_type())
            .field("id", &self.0.id())
            .finish()
    }
}

#[derive(Debug)]
pub enum RelationshipData<'a> {
    ToOne(Option<BoundResource<'a>>),
    ToMany(Vec<BoundResource<'a>>),
}

/// A resolved relationship of one resource.
#[derive(Debug)]
pub struct Relationship<'a> {
    data: RelationshipData<'a>,
    links: Option<Links>,
    meta: Option<Meta>,
    omit_data_when_not_included: bool,
}

impl<'a> Relationship<'a> {
    pub fn to_one(resource: Option<BoundResource<'a>>) -> Self {
        Self::from_data(RelationshipData::ToOne(resource))
    }

    pub fn to_many(resources: impl IntoIterator<Item = BoundResource<'a>>) -> Self {
        Self::from_data(RelationshipData::ToMany(resources.into_iter().collect()))
    }

    fn from_data(data: RelationshipData<'a>) -> Self {
        Self {
            data,
            links: None,
            meta: None,
            omit_data_when_not_included: false,
        }
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Emit only `links`/`meta` unless the relationship was requested via
    /// `include`.
    pub fn omit_data_when_not_included(mut self) -> Self {
        self.omit_data_when_not_included = true;
        self
    }

    pub fn data(&self) -> &RelationshipData<'a> {
        &self.data
    }

    pub fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    pub fn meta(&self) -> Option<&Meta> {
        self.meta.as_ref()
    }

    /// Related resources in linkage order.
    pub fn resources(&self) -> Vec<&BoundResource<'a>> {
        match &self.data {
            RelationshipData::ToOne(one) => one.iter().collect(),
            RelationshipData::ToMany(many) => many.iter().collect(),
        }
    }

    pub fn linkage(&self) -> Linkage {
        match &self.data {
            RelationshipData::ToOne(one) => Linkage::ToOne(one.as_ref().map(BoundResource::identifier)),
            RelationshipData::ToMany(many) => {
                Linkage::ToMany(many.iter().map(BoundResource::identifier).collect())
            }
        }
    }

    /// Wire form. `data` is dropped only when it is opted out and something
    /// else remains to show.
    pub(crate) fn to_object(&self, included: bool) -> RelationshipObject {
        let has_other = self.links.is_some() || self.meta.is_some();
        let data = if self.omit_data_when_not_included && !included && has_other {
            None
        } else {
            Some(self.linkage())
        };
        RelationshipObject {
            data,
            links: self.links.clone(),
            meta: self.meta.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Tag {
        id: u32,
        label: &'static str,
    }

    struct TagTransformer;

    impl ResourceTransformer<Tag> for TagTransformer {
        fn resource_type(&self, _: &Tag) -> String {
            "tags".into()
        }

        fn id(&self, tag: &Tag) -> String {
            tag.id.to_string()
        }

        fn attributes(&self, tag: &Tag) -> Attributes {
            let mut attributes = Attributes::new();
            attributes.insert("label".into(), json!(tag.label));
            attributes
        }

        fn relationship<'a>(&'a self, _: &'a Tag, _: &str) -> Result<Option<Relationship<'a>>, Error> {
            Ok(None)
        }
    }

    #[test]
    fn bound_resources_expose_identity() {
        let tag = Tag { id: 3, label: "sf" };
        let bound = BoundResource::new(&tag, &TagTransformer);
        assert_eq!(bound.identifier(), ResourceIdentifier::new("tags", "3"));

        let owned = BoundResource::owned(Tag { id: 4, label: "x" }, &TagTransformer);
        assert_eq!(owned.id(), "4");
    }

    #[test]
    fn linkage_follows_cardinality() {
        let a = Tag { id: 1, label: "a" };
        let b = Tag { id: 2, label: "b" };
        let many = Relationship::to_many([
            BoundResource::new(&a, &TagTransformer),
            BoundResource::new(&b, &TagTransformer),
        ]);
        assert_eq!(
            serde_json::to_value(many.linkage()).unwrap(),
            json!([{ "type": "tags", "id": "1" }, { "type": "tags", "id": "2" }])
        );
        assert_eq!(Relationship::to_one(None).linkage(), Linkage::ToOne(None));
    }

    #[test]
    fn data_is_omitted_only_with_links() {
        let a = Tag { id: 1, label: "a" };
        let rel = Relationship::to_one(Some(BoundResource::new(&a, &TagTransformer)))
            .omit_data_when_not_included();
        assert!(rel.to_object(false).data.is_some());

        let rel = rel.with_links(Links::new().with_related("/tags/1"));
        assert!(rel.to_object(false).data.is_none());
        assert!(rel.to_object(true).data.is_some());
    }
}
