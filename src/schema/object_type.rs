//! Object type definitions from the schema handling section of a resource.
//!
//! An [`ObjectTypeBean`] is the raw, partially specified form as stored on a
//! resource or template: every field except `kind` is optional so that merges
//! can tell "unset" from "set". [`ResourceObjectTypeDefinition`] is the
//! resolved form with all inheritance applied.

use super::types::{
    INTENT_DEFAULT, ItemName, LayerType, PropertyLimitations, ShadowKind, merge_limitations,
    normalize_intent,
};
use crate::error::{ConfigurationError, ConfigurationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reference from an object type to its super type within the same resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeSuperRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ShadowKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<i64>,
}

impl fmt::Display for ObjectTypeSuperRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.internal_id, self.kind) {
            (Some(id), _) => write!(f, "#{id}"),
            (None, Some(kind)) => write!(f, "{}/{}", kind, normalize_intent(self.intent.as_deref())),
            (None, None) => write!(f, "<empty>"),
        }
    }
}

/// Per-type refinement of one attribute of the object class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRefinement {
    #[serde(rename = "ref")]
    pub reference: ItemName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_identifier: Option<bool>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limitations: BTreeMap<LayerType, PropertyLimitations>,
}

impl AttributeRefinement {
    pub fn new(reference: ItemName) -> Self {
        Self {
            reference,
            display_name: None,
            mandatory: None,
            tolerant: None,
            secondary_identifier: None,
            limitations: BTreeMap::new(),
        }
    }

    /// Field-wise merge where `self` wins when set.
    pub fn merged_over(&self, parent: &AttributeRefinement) -> AttributeRefinement {
        AttributeRefinement {
            reference: self.reference.clone(),
            display_name: self.display_name.clone().or_else(|| parent.display_name.clone()),
            mandatory: self.mandatory.or(parent.mandatory),
            tolerant: self.tolerant.or(parent.tolerant),
            secondary_identifier: self.secondary_identifier.or(parent.secondary_identifier),
            limitations: merge_limitations(&self.limitations, &parent.limitations),
        }
    }
}

/// Merge refinement lists by `ref`; parent order first, child-only entries appended.
pub(crate) fn merge_refinements(
    child: &[AttributeRefinement],
    parent: &[AttributeRefinement],
) -> Vec<AttributeRefinement> {
    let mut merged: Vec<AttributeRefinement> = parent
        .iter()
        .map(|parent_ref| {
            match child
                .iter()
                .find(|c| c.reference.matches(&parent_ref.reference))
            {
                Some(child_ref) => child_ref.merged_over(parent_ref),
                None => parent_ref.clone(),
            }
        })
        .collect();
    for child_ref in child {
        if !parent
            .iter()
            .any(|p| p.reference.matches(&child_ref.reference))
        {
            merged.push(child_ref.clone());
        }
    }
    merged
}

/// Raw object type definition as written in `schemaHandling`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeBean {
    pub kind: ShadowKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_class: Option<ItemName>,
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_for_kind: Option<bool>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_type: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<i64>,
    #[serde(rename = "super", default, skip_serializing_if = "Option::is_none")]
    pub super_type: Option<ObjectTypeSuperRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auxiliary_object_classes: Vec<ItemName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeRefinement>,
}

impl ObjectTypeBean {
    pub fn new(kind: ShadowKind, intent: impl Into<String>) -> Self {
        Self {
            kind,
            intent: Some(intent.into()),
            ..Default::default()
        }
    }

    pub fn with_object_class(mut self, object_class: ItemName) -> Self {
        self.object_class = Some(object_class);
        self
    }

    pub fn as_default(mut self) -> Self {
        self.default_for_kind = Some(true);
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.abstract_type = Some(true);
        self
    }

    pub fn with_internal_id(mut self, id: i64) -> Self {
        self.internal_id = Some(id);
        self
    }

    pub fn with_super(mut self, super_ref: ObjectTypeSuperRef) -> Self {
        self.super_type = Some(super_ref);
        self
    }

    pub fn with_refinement(mut self, refinement: AttributeRefinement) -> Self {
        self.attributes.push(refinement);
        self
    }

    /// Effective intent; an absent intent means [`INTENT_DEFAULT`].
    pub fn effective_intent(&self) -> &str {
        normalize_intent(self.intent.as_deref())
    }

    /// The `(kind, intent)` key types are merged and looked up by.
    pub fn key(&self) -> (ShadowKind, String) {
        (self.kind, self.effective_intent().to_string())
    }

    pub fn is_abstract(&self) -> bool {
        self.abstract_type.unwrap_or(false)
    }

    pub fn is_default_for_kind(&self) -> bool {
        self.default_for_kind.unwrap_or(false)
    }

    pub fn identifier(&self) -> String {
        format!("{}/{}", self.kind, self.effective_intent())
    }

    /// Template merge: every field set on `self` wins, unset fields come from `parent`.
    pub fn merged_over(&self, parent: &ObjectTypeBean) -> ObjectTypeBean {
        ObjectTypeBean {
            kind: self.kind,
            intent: self.intent.clone().or_else(|| parent.intent.clone()),
            display_name: self.display_name.clone().or_else(|| parent.display_name.clone()),
            description: self.description.clone().or_else(|| parent.description.clone()),
            object_class: self.object_class.clone().or_else(|| parent.object_class.clone()),
            default_for_kind: self.default_for_kind.or(parent.default_for_kind),
            abstract_type: self.abstract_type.or(parent.abstract_type),
            internal_id: self.internal_id.or(parent.internal_id),
            super_type: self.super_type.clone().or_else(|| parent.super_type.clone()),
            auxiliary_object_classes: if self.auxiliary_object_classes.is_empty() {
                parent.auxiliary_object_classes.clone()
            } else {
                self.auxiliary_object_classes.clone()
            },
            attributes: merge_refinements(&self.attributes, &parent.attributes),
        }
    }

    /// Type inheritance: like [`merged_over`](Self::merged_over), except that the
    /// identity of the subtype (key, default and abstract flags, internal id,
    /// super reference) is never taken from the super type.
    pub fn inherit_from(&self, super_type: &ObjectTypeBean) -> ObjectTypeBean {
        let mut merged = self.merged_over(super_type);
        merged.intent = self.intent.clone();
        merged.default_for_kind = self.default_for_kind;
        merged.abstract_type = self.abstract_type;
        merged.internal_id = self.internal_id;
        merged.super_type = self.super_type.clone();
        merged
    }

    /// Check whether this bean is the target of a super reference.
    pub fn is_referenced_by(&self, super_ref: &ObjectTypeSuperRef) -> bool {
        if let Some(id) = super_ref.internal_id {
            return self.internal_id == Some(id);
        }
        match super_ref.kind {
            Some(kind) => {
                self.kind == kind
                    && self.effective_intent() == normalize_intent(super_ref.intent.as_deref())
            }
            None => false,
        }
    }
}

/// Resolved object type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceObjectTypeDefinition {
    kind: ShadowKind,
    intent: String,
    display_name: Option<String>,
    description: Option<String>,
    object_class: ItemName,
    default_for_kind: bool,
    internal_id: Option<i64>,
    auxiliary_object_classes: Vec<ItemName>,
    attribute_refinements: Vec<AttributeRefinement>,
}

impl ResourceObjectTypeDefinition {
    /// Build from a bean that already has type inheritance applied.
    pub fn from_bean(bean: &ObjectTypeBean) -> ConfigurationResult<Self> {
        let object_class =
            bean.object_class
                .clone()
                .ok_or_else(|| ConfigurationError::MissingObjectClass {
                    object_type: bean.identifier(),
                })?;
        Ok(Self {
            kind: bean.kind,
            intent: bean.effective_intent().to_string(),
            display_name: bean.display_name.clone(),
            description: bean.description.clone(),
            object_class,
            default_for_kind: bean.is_default_for_kind(),
            internal_id: bean.internal_id,
            auxiliary_object_classes: bean.auxiliary_object_classes.clone(),
            attribute_refinements: bean.attributes.clone(),
        })
    }

    pub fn kind(&self) -> ShadowKind {
        self.kind
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn object_class(&self) -> &ItemName {
        &self.object_class
    }

    pub fn is_default_for_kind(&self) -> bool {
        self.default_for_kind
    }

    pub fn internal_id(&self) -> Option<i64> {
        self.internal_id
    }

    pub fn auxiliary_object_classes(&self) -> &[ItemName] {
        &self.auxiliary_object_classes
    }

    pub fn attribute_refinements(&self) -> &[AttributeRefinement] {
        &self.attribute_refinements
    }

    pub fn find_refinement(&self, name: &ItemName) -> Option<&AttributeRefinement> {
        self.attribute_refinements
            .iter()
            .find(|r| r.reference.matches(name))
    }

    pub fn matches(&self, kind: ShadowKind, intent: &str) -> bool {
        self.kind == kind && self.intent == intent
    }

    pub fn is_default_intent(&self) -> bool {
        self.intent == INTENT_DEFAULT
    }

    pub fn identifier(&self) -> String {
        format!("{}/{}", self.kind, self.intent)
    }
}

impl fmt::Display for ResourceObjectTypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identifier(), self.object_class)
    }
}
