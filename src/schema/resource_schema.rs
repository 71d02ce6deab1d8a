//! Resource schema: object classes and object types of one expanded resource.
//!
//! The schema is built once per expanded resource. Building flattens the
//! intra-resource object type inheritance and checks the structural rules
//! (known object classes, unique kind/intent pairs, at most one default per
//! kind). After that it is immutable and shared behind an `Arc`.

use super::definition::ResourceObjectDefinition;
use super::object_class::ObjectClassDefinition;
use super::object_type::{ObjectTypeBean, ResourceObjectTypeDefinition};
use super::types::{ItemName, ShadowKind};
use crate::error::{ConfigurationError, ConfigurationResult};
use crate::resource::ResourceDefinition;
use log::{debug, trace};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ResourceSchema {
    resource_label: String,
    object_classes: Vec<Arc<ObjectClassDefinition>>,
    object_types: Vec<Arc<ResourceObjectTypeDefinition>>,
}

impl ResourceSchema {
    /// Build the schema of an (already expanded) resource.
    pub fn from_resource(resource: &ResourceDefinition) -> ConfigurationResult<Self> {
        let label = resource.label();
        let native = resource
            .schema
            .as_ref()
            .ok_or_else(|| ConfigurationError::MissingSchema {
                resource: label.clone(),
            })?;
        let beans = resource
            .schema_handling
            .as_ref()
            .map(|handling| handling.object_types.clone())
            .unwrap_or_default();
        Self::new(label, native.object_classes.clone(), beans)
    }

    /// Build a schema from object classes and raw object type beans.
    pub fn new(
        resource_label: impl Into<String>,
        object_classes: Vec<ObjectClassDefinition>,
        object_type_beans: Vec<ObjectTypeBean>,
    ) -> ConfigurationResult<Self> {
        let resource_label = resource_label.into();
        let object_classes: Vec<Arc<ObjectClassDefinition>> =
            object_classes.into_iter().map(Arc::new).collect();

        let flattened = resolve_type_inheritance(&resource_label, &object_type_beans)?;
        let mut object_types = Vec::new();
        for bean in flattened.iter().filter(|bean| !bean.is_abstract()) {
            let definition = ResourceObjectTypeDefinition::from_bean(bean)?;
            check_object_classes(&object_classes, &definition)?;
            trace!(
                "Resource {}: object type {} resolved",
                resource_label, definition
            );
            object_types.push(Arc::new(definition));
        }

        let schema = Self {
            resource_label,
            object_classes,
            object_types,
        };
        schema.check_unique_types()?;
        schema.check_single_default_per_kind()?;
        debug!(
            "Resource {}: schema with {} object classes and {} object types",
            schema.resource_label,
            schema.object_classes.len(),
            schema.object_types.len()
        );
        Ok(schema)
    }

    pub fn resource_label(&self) -> &str {
        &self.resource_label
    }

    pub fn object_classes(&self) -> &[Arc<ObjectClassDefinition>] {
        &self.object_classes
    }

    pub fn object_types(&self) -> &[Arc<ResourceObjectTypeDefinition>] {
        &self.object_types
    }

    pub fn find_object_class(&self, name: &ItemName) -> Option<&Arc<ObjectClassDefinition>> {
        self.object_classes.iter().find(|c| c.name.matches(name))
    }

    pub fn find_object_type(
        &self,
        kind: ShadowKind,
        intent: &str,
    ) -> Option<&Arc<ResourceObjectTypeDefinition>> {
        self.object_types.iter().find(|t| t.matches(kind, intent))
    }

    pub fn object_types_for_kind(&self, kind: ShadowKind) -> Vec<&Arc<ResourceObjectTypeDefinition>> {
        self.object_types.iter().filter(|t| t.kind() == kind).collect()
    }

    /// The type explicitly marked as default for the kind.
    pub fn default_object_type(&self, kind: ShadowKind) -> Option<&Arc<ResourceObjectTypeDefinition>> {
        self.object_types
            .iter()
            .find(|t| t.kind() == kind && t.is_default_for_kind())
    }

    /// Object-class level definition for a class name.
    pub fn object_class_definition(&self, name: &ItemName) -> Option<ResourceObjectDefinition> {
        self.find_object_class(name)
            .map(|class| ResourceObjectDefinition::for_object_class(Arc::clone(class)))
    }

    /// Object-type level definition for a kind/intent pair.
    pub fn object_type_definition(
        &self,
        kind: ShadowKind,
        intent: &str,
    ) -> Option<ResourceObjectDefinition> {
        self.find_object_type(kind, intent)
            .and_then(|object_type| self.definition_for_type(object_type))
    }

    /// Definition of a resolved type including the type's own auxiliary classes.
    pub fn definition_for_type(
        &self,
        object_type: &Arc<ResourceObjectTypeDefinition>,
    ) -> Option<ResourceObjectDefinition> {
        let class = self.find_object_class(object_type.object_class())?;
        let auxiliary: Vec<Arc<ObjectClassDefinition>> = object_type
            .auxiliary_object_classes()
            .iter()
            .filter_map(|name| self.find_object_class(name).cloned())
            .collect();
        Some(
            ResourceObjectDefinition::for_object_type(Arc::clone(class), Arc::clone(object_type))
                .with_auxiliary_object_classes(auxiliary),
        )
    }

    fn check_unique_types(&self) -> ConfigurationResult<()> {
        let mut seen = HashSet::new();
        for object_type in &self.object_types {
            if !seen.insert((object_type.kind(), object_type.intent().to_string())) {
                return Err(ConfigurationError::DuplicateObjectType {
                    kind: object_type.kind().to_string(),
                    intent: object_type.intent().to_string(),
                });
            }
        }
        Ok(())
    }

    fn check_single_default_per_kind(&self) -> ConfigurationResult<()> {
        let mut defaults: BTreeMap<ShadowKind, Vec<String>> = BTreeMap::new();
        for object_type in self.object_types.iter().filter(|t| t.is_default_for_kind()) {
            defaults
                .entry(object_type.kind())
                .or_default()
                .push(object_type.intent().to_string());
        }
        match defaults.into_iter().find(|(_, intents)| intents.len() > 1) {
            Some((kind, intents)) => Err(ConfigurationError::MultipleDefaults {
                kind: kind.to_string(),
                intents,
            }),
            None => Ok(()),
        }
    }
}

fn check_object_classes(
    object_classes: &[Arc<ObjectClassDefinition>],
    definition: &ResourceObjectTypeDefinition,
) -> ConfigurationResult<()> {
    let find = |name: &ItemName| object_classes.iter().find(|c| c.name.matches(name));
    match find(definition.object_class()) {
        Some(class) if !class.auxiliary => {}
        _ => {
            return Err(ConfigurationError::UnknownObjectClass {
                object_type: definition.identifier(),
                object_class: definition.object_class().to_string(),
            });
        }
    }
    for aux in definition.auxiliary_object_classes() {
        if find(aux).is_none() {
            return Err(ConfigurationError::UnknownObjectClass {
                object_type: definition.identifier(),
                object_class: aux.to_string(),
            });
        }
    }
    Ok(())
}

/// Flatten `super` references between object types of one resource.
///
/// Each bean is merged with its whole super chain, nearest super type winning.
/// A chain that revisits a bean is a configuration error.
pub(crate) fn resolve_type_inheritance(
    resource_label: &str,
    beans: &[ObjectTypeBean],
) -> ConfigurationResult<Vec<ObjectTypeBean>> {
    beans
        .iter()
        .enumerate()
        .map(|(index, bean)| {
            let chain = super_chain(resource_label, beans, index)?;
            // chain[0] is the bean itself, the last element is the root super type
            let mut iter = chain.iter().rev();
            let mut effective = match iter.next() {
                Some(root) => beans[*root].clone(),
                None => bean.clone(),
            };
            for index in iter {
                effective = beans[*index].inherit_from(&effective);
            }
            Ok(effective)
        })
        .collect()
}

fn super_chain(
    resource_label: &str,
    beans: &[ObjectTypeBean],
    start: usize,
) -> ConfigurationResult<Vec<usize>> {
    let mut chain = vec![start];
    let mut visited = HashSet::from([start]);
    let mut current = start;
    while let Some(super_ref) = &beans[current].super_type {
        let next = beans
            .iter()
            .position(|candidate| candidate.is_referenced_by(super_ref))
            .ok_or_else(|| ConfigurationError::MissingSuperType {
                object_type: beans[current].identifier(),
                reference: super_ref.to_string(),
            })?;
        if !visited.insert(next) {
            let mut path: Vec<String> = chain.iter().map(|i| beans[*i].identifier()).collect();
            path.push(beans[next].identifier());
            return Err(ConfigurationError::TypeInheritanceCycle {
                resource: resource_label.to_string(),
                path,
            });
        }
        chain.push(next);
        current = next;
    }
    Ok(chain)
}
