//! The resolved definition that governs interpretation of a shadow.
//!
//! A [`ResourceObjectDefinition`] is either an object-class definition (raw
//! connector class, used for whole-class operations and unclassified shadows)
//! or an object-type definition (a kind/intent refinement of a class). Both
//! can be extended by auxiliary object classes. The effective attribute
//! definitions are computed once at construction, so lookups are cheap and the
//! value is safe to share between threads.

use super::object_class::ObjectClassDefinition;
use super::object_type::ResourceObjectTypeDefinition;
use super::types::{ItemName, ResourceAttributeDefinition, ShadowKind, merge_limitations};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ResourceObjectDefinition {
    object_class: Arc<ObjectClassDefinition>,
    object_type: Option<Arc<ResourceObjectTypeDefinition>>,
    auxiliary_object_classes: Vec<Arc<ObjectClassDefinition>>,
    attributes: Vec<ResourceAttributeDefinition>,
}

impl ResourceObjectDefinition {
    /// Definition covering a whole object class.
    pub fn for_object_class(object_class: Arc<ObjectClassDefinition>) -> Self {
        let mut definition = Self {
            object_class,
            object_type: None,
            auxiliary_object_classes: Vec::new(),
            attributes: Vec::new(),
        };
        definition.attributes = definition.compute_attributes();
        definition
    }

    /// Definition of an object type on top of its object class.
    pub fn for_object_type(
        object_class: Arc<ObjectClassDefinition>,
        object_type: Arc<ResourceObjectTypeDefinition>,
    ) -> Self {
        let mut definition = Self {
            object_class,
            object_type: Some(object_type),
            auxiliary_object_classes: Vec::new(),
            attributes: Vec::new(),
        };
        definition.attributes = definition.compute_attributes();
        definition
    }

    /// Add auxiliary object classes. Classes already present are skipped.
    pub fn with_auxiliary_object_classes(
        mut self,
        auxiliary: impl IntoIterator<Item = Arc<ObjectClassDefinition>>,
    ) -> Self {
        for class in auxiliary {
            let already_present = class.name.matches(&self.object_class.name)
                || self
                    .auxiliary_object_classes
                    .iter()
                    .any(|existing| existing.name.matches(&class.name));
            if !already_present {
                self.auxiliary_object_classes.push(class);
            }
        }
        self.attributes = self.compute_attributes();
        self
    }

    fn compute_attributes(&self) -> Vec<ResourceAttributeDefinition> {
        let mut attributes: Vec<ResourceAttributeDefinition> = self
            .object_class
            .attributes
            .iter()
            .map(|attr| self.refine(attr))
            .collect();
        for class in &self.auxiliary_object_classes {
            for attr in &class.attributes {
                if !attributes.iter().any(|a| a.name.matches(&attr.name)) {
                    attributes.push(self.refine(attr));
                }
            }
        }
        attributes
    }

    fn refine(&self, attr: &ResourceAttributeDefinition) -> ResourceAttributeDefinition {
        let Some(refinement) = self
            .object_type
            .as_ref()
            .and_then(|t| t.find_refinement(&attr.name))
        else {
            return attr.clone();
        };
        let mut refined = attr.clone();
        if let Some(display_name) = &refinement.display_name {
            refined.display_name = Some(display_name.clone());
        }
        match refinement.mandatory {
            Some(true) => refined.min_occurs = refined.min_occurs.max(1),
            Some(false) => refined.min_occurs = 0,
            None => {}
        }
        if let Some(tolerant) = refinement.tolerant {
            refined.tolerant = tolerant;
        }
        if let Some(secondary) = refinement.secondary_identifier {
            refined.secondary_identifier = secondary;
        }
        refined.limitations = merge_limitations(&refinement.limitations, &attr.limitations);
        refined
    }

    pub fn is_object_class_definition(&self) -> bool {
        self.object_type.is_none()
    }

    pub fn is_object_type_definition(&self) -> bool {
        self.object_type.is_some()
    }

    pub fn object_class(&self) -> &ObjectClassDefinition {
        &self.object_class
    }

    pub fn object_class_name(&self) -> &ItemName {
        &self.object_class.name
    }

    pub fn object_type(&self) -> Option<&ResourceObjectTypeDefinition> {
        self.object_type.as_deref()
    }

    pub fn kind(&self) -> Option<ShadowKind> {
        self.object_type.as_ref().map(|t| t.kind())
    }

    pub fn intent(&self) -> Option<&str> {
        self.object_type.as_ref().map(|t| t.intent())
    }

    pub fn auxiliary_object_classes(&self) -> &[Arc<ObjectClassDefinition>] {
        &self.auxiliary_object_classes
    }

    pub fn auxiliary_object_class_names(&self) -> Vec<&ItemName> {
        self.auxiliary_object_classes
            .iter()
            .map(|c| &c.name)
            .collect()
    }

    pub fn has_auxiliary_object_class(&self, name: &ItemName) -> bool {
        self.auxiliary_object_classes
            .iter()
            .any(|c| c.name.matches(name))
    }

    /// Effective attribute definitions (class, refinements, auxiliary classes).
    pub fn attribute_definitions(&self) -> &[ResourceAttributeDefinition] {
        &self.attributes
    }

    pub fn find_attribute_definition(&self, name: &ItemName) -> Option<&ResourceAttributeDefinition> {
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

    pub fn is_primary_identifier(&self, name: &ItemName) -> bool {
        self.find_attribute_definition(name)
            .is_some_and(|attr| attr.primary_identifier)
    }

    pub fn is_secondary_identifier(&self, name: &ItemName) -> bool {
        self.find_attribute_definition(name)
            .is_some_and(|attr| attr.secondary_identifier)
    }

    /// Definition of the naming attribute declared by the object class.
    pub fn naming_attribute(&self) -> Option<&ResourceAttributeDefinition> {
        self.object_class
            .naming_attribute
            .as_ref()
            .and_then(|name| self.find_attribute_definition(name))
    }

    pub fn display_name_attribute(&self) -> Option<&ResourceAttributeDefinition> {
        self.object_class
            .display_name_attribute
            .as_ref()
            .and_then(|name| self.find_attribute_definition(name))
    }

    /// Human readable description used in logs and error messages.
    pub fn describe(&self) -> String {
        let base = match &self.object_type {
            Some(object_type) => format!("object type {object_type}"),
            None => format!("object class {}", self.object_class.name),
        };
        if self.auxiliary_object_classes.is_empty() {
            base
        } else {
            let aux: Vec<String> = self
                .auxiliary_object_classes
                .iter()
                .map(|c| c.name.to_string())
                .collect();
            format!("{base} + [{}]", aux.join(", "))
        }
    }
}

impl fmt::Display for ResourceObjectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
