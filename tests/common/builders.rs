//! Test data builders for resources, schemas and shadows.

use serde_json::Value;
use shadow_provisioning::Oid;
use shadow_provisioning::resource::ResourceDefinition;
use shadow_provisioning::schema::{
    AttributeType, ItemName, ObjectClassDefinition, ObjectTypeBean, ResourceAttributeDefinition,
    ShadowKind,
};
use shadow_provisioning::shadow::Shadow;

/// `ri:AccountObjectClass` with `icfs:uid` (primary) and `icfs:name` (secondary)
pub fn account_class() -> ObjectClassDefinition {
    ObjectClassDefinition::new(ItemName::ri("AccountObjectClass"))
        .with_attribute(
            ResourceAttributeDefinition::new(ItemName::icfs_uid(), AttributeType::String)
                .as_primary_identifier(),
        )
        .with_attribute(
            ResourceAttributeDefinition::new(ItemName::icfs_name(), AttributeType::String)
                .as_secondary_identifier(),
        )
        .with_attribute(ResourceAttributeDefinition::new(
            ItemName::ri("fullname"),
            AttributeType::String,
        ))
}

pub fn account_type(intent: &str) -> ObjectTypeBean {
    ObjectTypeBean::new(ShadowKind::Account, intent)
        .with_object_class(ItemName::ri("AccountObjectClass"))
}

/// Builder for a resource with a linear template chain.
///
/// Level 0 is the concrete resource; level `n` is its `n`-th ancestor. Each
/// level can set connector properties.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    levels: Vec<Vec<(String, Value)>>,
}

impl ChainBuilder {
    /// Create a chain of a resource and `depth` ancestors
    pub fn new(depth: usize) -> Self {
        Self {
            levels: vec![Vec::new(); depth + 1],
        }
    }

    pub fn with_property(mut self, level: usize, name: &str, value: Value) -> Self {
        self.levels[level].push((name.to_string(), value));
        self
    }

    pub fn oid(level: usize) -> Oid {
        Oid::new(format!("chain-{}", level)).expect("valid chain OID")
    }

    /// The resource and its ancestors, nearest ancestor first
    pub fn build(&self) -> (ResourceDefinition, Vec<ResourceDefinition>) {
        let depth = self.levels.len() - 1;
        let mut definitions: Vec<ResourceDefinition> = self
            .levels
            .iter()
            .enumerate()
            .map(|(level, properties)| {
                let mut definition = ResourceDefinition::new(Self::oid(level), format!("Level {}", level));
                if level > 0 {
                    definition = definition.as_template();
                }
                if level < depth {
                    definition = definition.extending(Self::oid(level + 1));
                } else {
                    definition = definition.with_object_class(account_class());
                }
                for (name, value) in properties {
                    definition = definition.with_connector_property(name.clone(), value.clone());
                }
                definition
            })
            .collect();
        let resource = definitions.remove(0);
        (resource, definitions)
    }
}

/// Builder for account shadows
#[derive(Debug, Clone)]
pub struct ShadowBuilder {
    shadow: Shadow,
}

impl ShadowBuilder {
    pub fn account(resource: &Oid) -> Self {
        Self {
            shadow: Shadow::for_resource(resource.clone())
                .with_kind(ShadowKind::Account)
                .with_object_class(ItemName::ri("AccountObjectClass")),
        }
    }

    pub fn intent(mut self, intent: &str) -> Self {
        self.shadow = self.shadow.with_intent(intent);
        self
    }

    pub fn uid(mut self, uid: &str) -> Self {
        self.shadow = self.shadow.with_attribute_value(ItemName::icfs_uid(), uid);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.shadow = self.shadow.with_attribute_value(ItemName::icfs_name(), name);
        self
    }

    pub fn attribute(mut self, name: ItemName, value: &str) -> Self {
        self.shadow = self.shadow.with_attribute_value(name, value);
        self
    }

    pub fn build(self) -> Shadow {
        self.shadow
    }
}
