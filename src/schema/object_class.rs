//! Object class definitions of the native resource schema.

use super::types::{ItemName, ResourceAttributeDefinition};
use serde::{Deserialize, Serialize};

/// An object class as exposed by the connector, e.g. `ri:AccountObjectClass`.
///
/// Auxiliary classes only contribute attributes; they cannot be the main class
/// of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectClassDefinition {
    pub name: ItemName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub auxiliary: bool,
    /// Attribute whose value names the object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming_attribute: Option<ItemName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name_attribute: Option<ItemName>,
    #[serde(default)]
    pub attributes: Vec<ResourceAttributeDefinition>,
}

impl ObjectClassDefinition {
    pub fn new(name: ItemName) -> Self {
        Self {
            name,
            native_name: None,
            display_name: None,
            description: None,
            auxiliary: false,
            naming_attribute: None,
            display_name_attribute: None,
            attributes: Vec::new(),
        }
    }

    pub fn auxiliary(mut self) -> Self {
        self.auxiliary = true;
        self
    }

    pub fn with_attribute(mut self, attribute: ResourceAttributeDefinition) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_naming_attribute(mut self, name: ItemName) -> Self {
        self.naming_attribute = Some(name);
        self
    }

    pub fn with_display_name_attribute(mut self, name: ItemName) -> Self {
        self.display_name_attribute = Some(name);
        self
    }

    pub fn find_attribute(&self, name: &ItemName) -> Option<&ResourceAttributeDefinition> {
        self.attributes.iter().find(|attr| attr.name.matches(name))
    }

    pub fn primary_identifiers(&self) -> Vec<&ResourceAttributeDefinition> {
        self.attributes
            .iter()
            .filter(|attr| attr.primary_identifier)
            .collect()
    }

    pub fn secondary_identifiers(&self) -> Vec<&ResourceAttributeDefinition> {
        self.attributes
            .iter()
            .filter(|attr| attr.secondary_identifier)
            .collect()
    }
}
