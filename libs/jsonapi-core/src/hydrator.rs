//! Mapping write payloads onto domain objects.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::error::Error;
use crate::request::JsonApiRequest;
use crate::schema::{Meta, ResourceIdentifier};

#[derive(Clone, Debug, PartialEq)]
pub struct ToOneRelationship {
    pub identifier: Option<ResourceIdentifier>,
    pub meta: Option<Meta>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToManyRelationship {
    pub identifiers: Vec<ResourceIdentifier>,
    pub meta: Option<Meta>,
}

/// A relationship as it appears under `data.relationships` of a request.
#[derive(Clone, Debug, PartialEq)]
pub enum RelationshipPayload {
    ToOne(ToOneRelationship),
    ToMany(ToManyRelationship),
}

impl RelationshipPayload {
    /// Parse a relationship object. `data: null` and `data: {..}` are to-one,
    /// `data: [..]` is to-many.
    pub fn from_value(name: &str, value: &Value) -> Result<Self, Error> {
        let invalid = || {
            Error::RequestBodyInvalidJson(format!("relationship '{name}' must carry valid resource linkage"))
        };
        let meta = value.get("meta").and_then(Value::as_object).cloned();
        match value.get("data").ok_or_else(invalid)? {
            Value::Null => Ok(Self::ToOne(ToOneRelationship {
                identifier: None,
                meta,
            })),
            object @ Value::Object(_) => Ok(Self::ToOne(ToOneRelationship {
                identifier: Some(ResourceIdentifier::from_value(object).ok_or_else(invalid)?),
                meta,
            })),
            Value::Array(items) => {
                let identifiers = items
                    .iter()
                    .map(|item| ResourceIdentifier::from_value(item).ok_or_else(invalid))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::ToMany(ToManyRelationship { identifiers, meta }))
            }
            _ => Err(invalid()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::ToOne(_) => "to-one",
            Self::ToMany(_) => "to-many",
        }
    }

    pub fn into_to_one(self, name: &str) -> Result<ToOneRelationship, Error> {
        match self {
            Self::ToOne(rel) => Ok(rel),
            other => Err(Error::RelationshipTypeInappropriate {
                name: name.to_string(),
                given: other.kind(),
                expected: "to-one",
            }),
        }
    }

    pub fn into_to_many(self, name: &str) -> Result<ToManyRelationship, Error> {
        match self {
            Self::ToMany(rel) => Ok(rel),
            other => Err(Error::RelationshipTypeInappropriate {
                name: name.to_string(),
                given: other.kind(),
                expected: "to-many",
            }),
        }
    }
}

/// Fills a domain object of type `T` from the request document.
///
/// Attributes and relationships the implementation does not know about should
/// simply be ignored.
pub trait Hydrator<T> {
    /// Resource types this hydrator accepts in `data.type`.
    fn accepted_types(&self) -> &[&str];

    /// Called when a create request carries its own id.
    fn validate_client_generated_id(&self, id: &str, _request: &JsonApiRequest) -> Result<(), Error> {
        Err(Error::ClientGeneratedIdNotSupported { id: id.to_string() })
    }

    fn generate_id(&self) -> String;

    fn set_id(&self, object: &mut T, id: &str);

    fn hydrate_attributes(&self, object: &mut T, attributes: &Map<String, Value>) -> Result<(), Error>;

    fn hydrate_relationship(
        &self,
        _object: &mut T,
        _name: &str,
        _relationship: RelationshipPayload,
    ) -> Result<(), Error> {
        Ok(())
    }

    #[instrument(name = "jsonapi.hydrate.create", skip_all)]
    fn hydrate_for_create(&self, request: &JsonApiRequest, mut object: T) -> Result<T, Error> {
        let data = validated_data(request, self.accepted_types())?;

        let id = match data.get("id").and_then(Value::as_str) {
            Some(id) => {
                self.validate_client_generated_id(id, request)?;
                id.to_string()
            }
            None => self.generate_id(),
        };
        debug!(id = %id, "Hydrating new resource");
        self.set_id(&mut object, &id);

        hydrate_members(self, &mut object, data)?;
        Ok(object)
    }

    #[instrument(name = "jsonapi.hydrate.update", skip_all)]
    fn hydrate_for_update(&self, request: &JsonApiRequest, mut object: T) -> Result<T, Error> {
        let data = validated_data(request, self.accepted_types())?;

        let id = data
            .get("id")
            .and_then(Value::as_str)
            .ok_or(Error::ResourceIdMissing)?;
        self.set_id(&mut object, id);

        hydrate_members(self, &mut object, data)?;
        Ok(object)
    }
}

fn validated_data<'r>(request: &'r JsonApiRequest, accepted: &[&str]) -> Result<&'r Map<String, Value>, Error> {
    let data = request
        .body_data()
        .and_then(Value::as_object)
        .ok_or(Error::ResourceTypeMissing)?;
    let resource_type = data
        .get("type")
        .and_then(Value::as_str)
        .ok_or(Error::ResourceTypeMissing)?;
    if !accepted.contains(&resource_type) {
        return Err(Error::ResourceTypeUnacceptable {
            given: resource_type.to_string(),
            accepted: accepted.iter().map(|t| t.to_string()).collect(),
        });
    }
    Ok(data)
}

fn hydrate_members<T, H>(hydrator: &H, object: &mut T, data: &Map<String, Value>) -> Result<(), Error>
where
    H: Hydrator<T> + ?Sized,
{
    if let Some(attributes) = data.get("attributes").and_then(Value::as_object) {
        hydrator.hydrate_attributes(object, attributes)?;
    }
    if let Some(relationships) = data.get("relationships").and_then(Value::as_object) {
        for (name, value) in relationships {
            let payload = RelationshipPayload::from_value(name, value)?;
            hydrator.hydrate_relationship(object, name, payload)?;
        }
    }
    Ok(())
}
