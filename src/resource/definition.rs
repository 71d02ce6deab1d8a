//! Raw resource definitions as stored in the repository.
//!
//! A resource may be concrete, a template (`template: true`) or abstract, and
//! may extend another resource via `super.resourceRef`. The structures here
//! are plain serde models; inheritance is applied by
//! [`ResourceExpander`](super::ResourceExpander).

use crate::oid::Oid;
use crate::schema::{ObjectClassDefinition, ObjectTypeBean};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Connector configuration properties, keyed by property name.
pub type ConnectorConfiguration = BTreeMap<String, Value>;

/// Reference to the resource this one extends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSuperRef {
    pub resource_ref: Oid,
}

/// A secondary connector used by the resource, identified by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalConnector {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_ref: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub connector_configuration: ConnectorConfiguration,
}

impl AdditionalConnector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connector_ref: None,
            connector_configuration: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.connector_configuration.insert(name.into(), value);
        self
    }
}

/// Native schema of the resource: the object classes the connector exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSchema {
    #[serde(default)]
    pub object_classes: Vec<ObjectClassDefinition>,
}

/// Object types defined on top of the native schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaHandling {
    #[serde(default)]
    pub object_types: Vec<ObjectTypeBean>,
}

/// A resource definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub oid: Oid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Repository version of the object, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub template: bool,
    #[serde(rename = "abstract", default)]
    pub abstract_resource: bool,
    #[serde(rename = "super", default, skip_serializing_if = "Option::is_none")]
    pub super_ref: Option<ResourceSuperRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_ref: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub connector_configuration: ConnectorConfiguration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_connectors: Vec<AdditionalConnector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<NativeSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_handling: Option<SchemaHandling>,
}

impl ResourceDefinition {
    pub fn new(oid: Oid, name: impl Into<String>) -> Self {
        Self {
            oid,
            name: name.into(),
            description: None,
            version: None,
            template: false,
            abstract_resource: false,
            super_ref: None,
            connector_ref: None,
            connector_configuration: BTreeMap::new(),
            additional_connectors: Vec::new(),
            schema: None,
            schema_handling: None,
        }
    }

    pub fn as_template(mut self) -> Self {
        self.template = true;
        self
    }

    pub fn extending(mut self, super_oid: Oid) -> Self {
        self.super_ref = Some(ResourceSuperRef {
            resource_ref: super_oid,
        });
        self
    }

    pub fn with_connector_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.connector_configuration.insert(name.into(), value);
        self
    }

    pub fn with_additional_connector(mut self, connector: AdditionalConnector) -> Self {
        self.additional_connectors.push(connector);
        self
    }

    pub fn with_object_class(mut self, object_class: ObjectClassDefinition) -> Self {
        self.schema
            .get_or_insert_with(NativeSchema::default)
            .object_classes
            .push(object_class);
        self
    }

    pub fn with_object_type(mut self, object_type: ObjectTypeBean) -> Self {
        self.schema_handling
            .get_or_insert_with(SchemaHandling::default)
            .object_types
            .push(object_type);
        self
    }

    /// OID of the resource this one extends.
    pub fn super_oid(&self) -> Option<&Oid> {
        self.super_ref.as_ref().map(|s| &s.resource_ref)
    }

    /// Whether the resource can back a provisioning context.
    pub fn is_concrete(&self) -> bool {
        !self.template && !self.abstract_resource
    }

    pub fn additional_connector(&self, name: &str) -> Option<&AdditionalConnector> {
        self.additional_connectors.iter().find(|c| c.name == name)
    }

    /// Label used in logs and error messages.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.oid)
    }
}
