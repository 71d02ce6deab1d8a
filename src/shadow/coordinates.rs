//! Resource/kind/intent/object class coordinates and shadow queries.

use crate::error::{ProvisioningError, ProvisioningResult, SchemaError, SchemaResult};
use crate::oid::Oid;
use crate::schema::{INTENT_UNKNOWN, ItemName, ShadowKind};
use crate::shadow::attributes::AttributeValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where on a resource a set of shadows lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceShadowCoordinates {
    pub resource_oid: Oid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ShadowKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_class: Option<ItemName>,
}

impl ResourceShadowCoordinates {
    pub fn new(resource_oid: Oid) -> Self {
        Self {
            resource_oid,
            kind: None,
            intent: None,
            object_class: None,
        }
    }

    pub fn for_kind_intent(resource_oid: Oid, kind: ShadowKind, intent: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            intent: Some(intent.into()),
            ..Self::new(resource_oid)
        }
    }

    pub fn for_object_class(resource_oid: Oid, object_class: ItemName) -> Self {
        Self {
            object_class: Some(object_class),
            ..Self::new(resource_oid)
        }
    }

    pub fn with_kind(mut self, kind: ShadowKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    pub fn with_object_class(mut self, object_class: ItemName) -> Self {
        self.object_class = Some(object_class);
        self
    }

    /// Neither kind nor intent nor object class is given.
    pub fn is_wildcard(&self) -> bool {
        self.kind.is_none() && self.intent.is_none() && self.object_class.is_none()
    }

    /// Reject the `unknown` sentinels, which only stored shadows may carry.
    pub fn check_not_unknown(&self) -> ProvisioningResult<()> {
        if self.kind.is_some_and(|kind| kind.is_unknown()) {
            return Err(ProvisioningError::invalid_argument(format!(
                "Unknown kind is not allowed in {self}"
            )));
        }
        if self.intent.as_deref() == Some(INTENT_UNKNOWN) {
            return Err(ProvisioningError::invalid_argument(format!(
                "Unknown intent is not allowed in {self}"
            )));
        }
        Ok(())
    }

    /// Extract coordinates from the top-level conjuncts of a query.
    pub fn from_query(query: &ShadowQuery) -> SchemaResult<Self> {
        let mut resource: Option<Oid> = None;
        let mut kind: Option<ShadowKind> = None;
        let mut intent: Option<String> = None;
        let mut object_class: Option<ItemName> = None;

        for filter in query.conjuncts() {
            match filter {
                ShadowFilter::ResourceRef(oid) => set_once(&mut resource, oid, "resourceRef")?,
                ShadowFilter::Kind(value) => set_once(&mut kind, value, "kind")?,
                ShadowFilter::Intent(value) => set_once(&mut intent, value, "intent")?,
                ShadowFilter::ObjectClass(value) => {
                    set_once(&mut object_class, value, "objectClass")?
                }
                ShadowFilter::Attribute { .. } | ShadowFilter::And(_) => {}
            }
        }

        let resource_oid = resource.ok_or(SchemaError::MissingResourceInQuery)?;
        Ok(Self {
            resource_oid,
            kind,
            intent,
            object_class,
        })
    }
}

fn set_once<T: Clone + PartialEq + fmt::Display>(
    slot: &mut Option<T>,
    value: &T,
    coordinate: &str,
) -> SchemaResult<()> {
    match slot {
        Some(existing) if existing != value => Err(SchemaError::ConflictingQueryCoordinate {
            coordinate: coordinate.to_string(),
            first: existing.to_string(),
            second: value.to_string(),
        }),
        Some(_) => Ok(()),
        None => {
            *slot = Some(value.clone());
            Ok(())
        }
    }
}

impl fmt::Display for ResourceShadowCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource {}", self.resource_oid)?;
        if let Some(kind) = self.kind {
            write!(f, ", kind {kind}")?;
        }
        if let Some(intent) = &self.intent {
            write!(f, ", intent {intent}")?;
        }
        if let Some(object_class) = &self.object_class {
            write!(f, ", object class {object_class}")?;
        }
        Ok(())
    }
}

/// A filter over shadows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShadowFilter {
    ResourceRef(Oid),
    Kind(ShadowKind),
    Intent(String),
    ObjectClass(ItemName),
    /// Equality on an attribute value
    Attribute {
        name: ItemName,
        value: AttributeValue,
    },
    And(Vec<ShadowFilter>),
}

/// A shadow search query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShadowQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ShadowFilter>,
}

impl ShadowQuery {
    pub fn new(filter: ShadowFilter) -> Self {
        Self {
            filter: Some(filter),
        }
    }

    /// Conjunction of the given filters.
    pub fn and(filters: Vec<ShadowFilter>) -> Self {
        Self::new(ShadowFilter::And(filters))
    }

    /// Filters that must all hold: the members of a top-level `and`, or the
    /// single top-level filter.
    pub fn conjuncts(&self) -> Vec<&ShadowFilter> {
        match &self.filter {
            Some(ShadowFilter::And(filters)) => filters.iter().collect(),
            Some(filter) => vec![filter],
            None => Vec::new(),
        }
    }
}
