//! Merging of a resource definition over its ancestor.
//!
//! All functions are pure: they take the child and the (already merged)
//! ancestor by reference and return a new value.

use super::definition::{
    AdditionalConnector, ConnectorConfiguration, NativeSchema, ResourceDefinition, SchemaHandling,
};
use crate::schema::{ObjectClassDefinition, ObjectTypeBean};

/// Merge `child` over `ancestor`. Identity and the template/abstract flags
/// always come from the child.
pub fn merge_resource(child: &ResourceDefinition, ancestor: &ResourceDefinition) -> ResourceDefinition {
    ResourceDefinition {
        oid: child.oid.clone(),
        name: child.name.clone(),
        description: child
            .description
            .clone()
            .or_else(|| ancestor.description.clone()),
        version: child.version.clone(),
        template: child.template,
        abstract_resource: child.abstract_resource,
        super_ref: child.super_ref.clone(),
        connector_ref: child
            .connector_ref
            .clone()
            .or_else(|| ancestor.connector_ref.clone()),
        connector_configuration: merge_configuration(
            &child.connector_configuration,
            &ancestor.connector_configuration,
        ),
        additional_connectors: merge_additional_connectors(
            &child.additional_connectors,
            &ancestor.additional_connectors,
        ),
        schema: merge_options(&child.schema, &ancestor.schema, merge_native_schema),
        schema_handling: merge_options(
            &child.schema_handling,
            &ancestor.schema_handling,
            merge_schema_handling,
        ),
    }
}

fn merge_options<T: Clone>(
    child: &Option<T>,
    ancestor: &Option<T>,
    merge: impl Fn(&T, &T) -> T,
) -> Option<T> {
    match (child, ancestor) {
        (Some(child), Some(ancestor)) => Some(merge(child, ancestor)),
        (Some(value), None) | (None, Some(value)) => Some(value.clone()),
        (None, None) => None,
    }
}

/// Per-property merge; child properties override ancestor properties.
pub fn merge_configuration(
    child: &ConnectorConfiguration,
    ancestor: &ConnectorConfiguration,
) -> ConnectorConfiguration {
    let mut merged = ancestor.clone();
    merged.extend(child.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Merge additional connectors by name: ancestor order first, child-only
/// connectors appended.
pub fn merge_additional_connectors(
    child: &[AdditionalConnector],
    ancestor: &[AdditionalConnector],
) -> Vec<AdditionalConnector> {
    let mut merged: Vec<AdditionalConnector> = ancestor
        .iter()
        .map(|inherited| match child.iter().find(|c| c.name == inherited.name) {
            Some(own) => AdditionalConnector {
                name: own.name.clone(),
                connector_ref: own
                    .connector_ref
                    .clone()
                    .or_else(|| inherited.connector_ref.clone()),
                connector_configuration: merge_configuration(
                    &own.connector_configuration,
                    &inherited.connector_configuration,
                ),
            },
            None => inherited.clone(),
        })
        .collect();
    merged.extend(
        child
            .iter()
            .filter(|own| !ancestor.iter().any(|a| a.name == own.name))
            .cloned(),
    );
    merged
}

/// Object classes are merged by name; a child class replaces the inherited one.
pub fn merge_native_schema(child: &NativeSchema, ancestor: &NativeSchema) -> NativeSchema {
    let mut object_classes: Vec<ObjectClassDefinition> = ancestor
        .object_classes
        .iter()
        .map(|inherited| {
            child
                .object_classes
                .iter()
                .find(|own| own.name.matches(&inherited.name))
                .unwrap_or(inherited)
                .clone()
        })
        .collect();
    object_classes.extend(
        child
            .object_classes
            .iter()
            .filter(|own| {
                !ancestor
                    .object_classes
                    .iter()
                    .any(|a| a.name.matches(&own.name))
            })
            .cloned(),
    );
    NativeSchema { object_classes }
}

/// Object types are merged by `(kind, intent)`, field by field.
pub fn merge_schema_handling(child: &SchemaHandling, ancestor: &SchemaHandling) -> SchemaHandling {
    let mut object_types: Vec<ObjectTypeBean> = ancestor
        .object_types
        .iter()
        .map(|inherited| {
            match child
                .object_types
                .iter()
                .find(|own| own.key() == inherited.key())
            {
                Some(own) => own.merged_over(inherited),
                None => inherited.clone(),
            }
        })
        .collect();
    object_types.extend(
        child
            .object_types
            .iter()
            .filter(|own| {
                !ancestor
                    .object_types
                    .iter()
                    .any(|a| a.key() == own.key())
            })
            .cloned(),
    );
    SchemaHandling { object_types }
}
