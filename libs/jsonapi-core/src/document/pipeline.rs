use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, instrument};

use super::{Document, DocumentSections};
use crate::error::Error;
use crate::request::{IncludeTree, JsonApiRequest};
use crate::schema::{JsonApiObject, PrimaryData, ResourceObject};
use crate::transformer::BoundResource;

/// Primary data handed to the pipeline.
pub(crate) enum Primary<'a> {
    Single(Option<BoundResource<'a>>),
    Many(Vec<BoundResource<'a>>),
}

/// State of one document build: the request plus everything collected into
/// `included` so far.
struct Transformation<'r> {
    request: &'r JsonApiRequest,
    included: Vec<ResourceObject>,
    seen: HashSet<(String, String)>,
    /// Include path -> relationship names offered by the resources rendered there.
    known: HashMap<String, HashSet<&'static str>>,
}

impl<'r> Transformation<'r> {
    fn new(request: &'r JsonApiRequest) -> Self {
        Self {
            request,
            included: Vec::new(),
            seen: HashSet::new(),
            known: HashMap::new(),
        }
    }

    fn record_names(&mut self, path: &str, names: &'static [&'static str]) {
        self.known.entry(path.to_string()).or_default().extend(names);
    }

    /// Every `include` name must exist on some resource rendered at its path.
    /// Paths below relationships that resolved to nothing are never reached
    /// and so cannot be judged.
    fn check_inclusion(&self) -> Result<(), Error> {
        for (path, names) in &self.known {
            if let Some(unknown) = self
                .request
                .included_relationships(path)
                .into_iter()
                .find(|name| !names.contains(*name))
            {
                debug!(path = %path, relationship = unknown, "Unknown include path");
                return Err(Error::InclusionUnsupported);
            }
        }
        Ok(())
    }

    /// Primary resources never reappear in `included`.
    fn mark_seen(&mut self, resource: &BoundResource<'_>) {
        self.seen.insert((resource.resource_type(), resource.id()));
    }

    fn transform(&mut self, resource: &BoundResource<'_>, base_path: &str) -> Result<ResourceObject, Error> {
        let inner = resource.inner();
        let resource_type = inner.resource_type();
        let request = self.request;
        self.record_names(base_path, inner.relationship_names());

        let mut attributes = inner.attributes();
        attributes.retain(|name, _| request.is_included_field(&resource_type, name));

        let defaults = inner.default_included_relationships();
        let mut relationships = BTreeMap::new();
        for &name in inner.relationship_names() {
            let in_fieldset = request.is_included_field(&resource_type, name);
            let in_include = request.is_included_relationship(base_path, name, defaults);
            if !in_fieldset && !in_include {
                continue;
            }

            let Some(relationship) = inner.relationship(name)? else {
                debug!(resource_type = %resource_type, relationship = name, "Relationship resolved to nothing");
                continue;
            };

            if in_include {
                let child_path = IncludeTree::child_path(base_path, name);
                for related in relationship.resources() {
                    self.include(related, &child_path)?;
                }
            }
            if in_fieldset {
                relationships.insert(name.to_string(), relationship.to_object(in_include));
            }
        }

        Ok(ResourceObject {
            resource_type,
            id: inner.id(),
            attributes,
            relationships,
            links: inner.links().filter(|l| !l.is_empty()),
            meta: inner.meta(),
        })
    }

    /// Render a related resource into `included`, keyed by `(type, id)`.
    ///
    /// The walk continues below resources already seen, since another path
    /// may request different nested includes.
    fn include(&mut self, resource: &BoundResource<'_>, path: &str) -> Result<(), Error> {
        debug!(path, resource_type = %resource.resource_type(), id = %resource.id(), "Including related resource");
        let object = self.transform(resource, path)?;
        if self
            .seen
            .insert((object.resource_type.clone(), object.id.clone()))
        {
            self.included.push(object);
        }
        Ok(())
    }
}

fn jsonapi_block(request: &JsonApiRequest, sections: &dyn DocumentSections) -> Option<JsonApiObject> {
    sections
        .jsonapi()
        .or_else(|| Some(JsonApiObject::new(request.config().version.clone())))
}

/// Build a single-resource or collection document.
#[instrument(name = "jsonapi.document.resources", skip_all, fields(method = %request.method()))]
pub(crate) fn build_resources(
    request: &JsonApiRequest,
    sections: &dyn DocumentSections,
    primary: Primary<'_>,
) -> Result<Document, Error> {
    if request.is_write() && request.body_data_type().is_none() {
        return Err(Error::ResourceTypeMissing);
    }

    let mut transformation = Transformation::new(request);
    let data = match primary {
        Primary::Single(None) => PrimaryData::Resource(None),
        Primary::Single(Some(resource)) => {
            transformation.mark_seen(&resource);
            let object = transformation.transform(&resource, "")?;
            PrimaryData::Resource(Some(Box::new(object)))
        }
        Primary::Many(resources) => {
            for resource in &resources {
                transformation.mark_seen(resource);
            }
            let objects = resources
                .iter()
                .map(|resource| transformation.transform(resource, ""))
                .collect::<Result<Vec<_>, _>>()?;
            PrimaryData::Collection(objects)
        }
    };
    transformation.check_inclusion()?;

    Ok(Document::success(
        jsonapi_block(request, sections),
        sections.meta(),
        sections.links(),
        data,
        transformation.included,
    ))
}

/// Build a relationship document for `name` of `resource`.
///
/// `data` is identifier linkage only; `include` paths are resolved below the
/// relationship name.
#[instrument(name = "jsonapi.document.relationship", skip_all, fields(relationship = name))]
pub(crate) fn build_relationship(
    request: &JsonApiRequest,
    sections: &dyn DocumentSections,
    resource: &BoundResource<'_>,
    name: &str,
) -> Result<Document, Error> {
    let inner = resource.inner();
    if !inner.relationship_names().contains(&name) {
        return Err(Error::RelationshipNotExists {
            name: name.to_string(),
        });
    }
    let relationship = inner
        .relationship(name)?
        .ok_or_else(|| Error::RelationshipNotExists {
            name: name.to_string(),
        })?;

    // the owner is not primary data here, so it may appear in `included`
    let mut transformation = Transformation::new(request);
    transformation.record_names("", inner.relationship_names());
    if request.included_relationships("").contains(&name) {
        for related in relationship.resources() {
            transformation.include(related, name)?;
        }
    }
    transformation.check_inclusion()?;

    let links = sections.links().or_else(|| relationship.links().cloned());
    let meta = sections.meta().or_else(|| relationship.meta().cloned());

    Ok(Document::success(
        jsonapi_block(request, sections),
        meta,
        links,
        PrimaryData::Relationship(relationship.linkage()),
        transformation.included,
    ))
}
