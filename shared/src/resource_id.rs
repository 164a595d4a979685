use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur while building or parsing a resource identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceIdentifierError {
    /// The canonical form is `"<resourceType>:<resourceId>"` with a
    /// non-empty type (no `:`) and a non-empty id
    #[error("Invalid resource identifier: {input:?}")]
    Invalid { input: String },
}

/// Names one live shared-state instance: a `(resourceType, resourceId)` pair
/// with the canonical string form `"type:id"`.
///
/// The first `:` separates type from id, so the id half may itself contain
/// `:`. Both the object and the canonical string form round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    resource_type: String,
    resource_id: String,
}

impl ResourceIdentifier {
    pub fn new(resource_type: &str, resource_id: &str) -> Result<Self, ResourceIdentifierError> {
        if resource_type.is_empty() || resource_type.contains(':') || resource_id.is_empty() {
            return Err(ResourceIdentifierError::Invalid {
                input: format!("{resource_type}:{resource_id}"),
            });
        }
        Ok(Self {
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
        })
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// The `"type:id"` form.
    pub fn canonical(&self) -> String {
        format!("{}:{}", self.resource_type, self.resource_id)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.resource_id)
    }
}

impl FromStr for ResourceIdentifier {
    type Err = ResourceIdentifierError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.split_once(':') {
            Some((resource_type, resource_id)) => Self::new(resource_type, resource_id)
                .map_err(|_| ResourceIdentifierError::Invalid {
                    input: input.to_string(),
                }),
            None => Err(ResourceIdentifierError::Invalid {
                input: input.to_string(),
            }),
        }
    }
}

impl Serialize for ResourceIdentifier {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for ResourceIdentifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let input = String::deserialize(deserializer)?;
        input.parse().map_err(de::Error::custom)
    }
}
