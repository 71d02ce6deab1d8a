//! Core schema type definitions for resource objects.
//!
//! This module contains the fundamental data structures of a resource schema:
//! qualified item names, shadow kinds, intents, attribute value types and
//! attribute definitions with their per-layer access limitations.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Intent used when an object type does not declare one.
pub const INTENT_DEFAULT: &str = "default";

/// Intent sentinel carried by shadows that are not classified yet.
pub const INTENT_UNKNOWN: &str = "unknown";

/// Prefix of the resource instance namespace (object classes, native attributes).
pub const PREFIX_RI: &str = "ri";

/// Prefix of the connector framework special attributes namespace.
pub const PREFIX_ICFS: &str = "icfs";

/// A qualified item name such as `ri:AccountObjectClass` or `icfs:name`.
///
/// The prefix is optional. Equality is exact, while [`ItemName::matches`]
/// treats an absent prefix as a wildcard, so `uid` matches `ri:uid`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemName {
    prefix: Option<String>,
    local_name: String,
}

impl ItemName {
    /// Create a qualified name.
    pub fn new(prefix: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a name without a prefix.
    pub fn unqualified(local_name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local_name: local_name.into(),
        }
    }

    /// Create a name in the resource instance namespace.
    pub fn ri(local_name: impl Into<String>) -> Self {
        Self::new(PREFIX_RI, local_name)
    }

    /// Create a name in the connector framework namespace.
    pub fn icfs(local_name: impl Into<String>) -> Self {
        Self::new(PREFIX_ICFS, local_name)
    }

    /// The well-known `icfs:name` attribute.
    pub fn icfs_name() -> Self {
        Self::icfs("name")
    }

    /// The well-known `icfs:uid` attribute.
    pub fn icfs_uid() -> Self {
        Self::icfs("uid")
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Check whether two names denote the same item.
    ///
    /// Local names must be equal. Prefixes must be equal when both are present.
    pub fn matches(&self, other: &ItemName) -> bool {
        if self.local_name != other.local_name {
            return false;
        }
        match (&self.prefix, &other.prefix) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for ItemName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

impl FromStr for ItemName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (prefix, local) = match trimmed.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, trimmed),
        };
        if local.is_empty() {
            return Err(format!("Invalid item name: '{s}'"));
        }
        Ok(match prefix {
            Some(prefix) if !prefix.is_empty() => Self::new(prefix, local),
            _ => Self::unqualified(local),
        })
    }
}

impl Serialize for ItemName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ItemName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Coarse category of a resource object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowKind {
    Account,
    Entitlement,
    Generic,
    /// Sentinel for shadows that were not classified yet
    Unknown,
}

impl ShadowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShadowKind::Account => "account",
            ShadowKind::Entitlement => "entitlement",
            ShadowKind::Generic => "generic",
            ShadowKind::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ShadowKind::Unknown)
    }
}

impl Default for ShadowKind {
    fn default() -> Self {
        Self::Account
    }
}

impl fmt::Display for ShadowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShadowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "account" => Ok(ShadowKind::Account),
            "entitlement" => Ok(ShadowKind::Entitlement),
            "generic" => Ok(ShadowKind::Generic),
            "unknown" => Ok(ShadowKind::Unknown),
            _ => Err(format!("Unknown shadow kind: {s}")),
        }
    }
}

/// Returns true for the `unknown` intent sentinel.
pub fn is_unknown_intent(intent: Option<&str>) -> bool {
    intent == Some(INTENT_UNKNOWN)
}

/// Map an absent or blank intent to [`INTENT_DEFAULT`].
pub fn normalize_intent(intent: Option<&str>) -> &str {
    match intent {
        Some(value) if !value.trim().is_empty() => value,
        _ => INTENT_DEFAULT,
    }
}

/// Value types of resource attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    String,
    /// 32-bit integer
    Int,
    /// 64-bit integer
    Long,
    Boolean,
    Decimal,
    /// Timestamp in RFC3339 format
    DateTime,
    /// Binary data (base64 encoded in JSON)
    Binary,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Int => "int",
            AttributeType::Long => "long",
            AttributeType::Boolean => "boolean",
            AttributeType::Decimal => "decimal",
            AttributeType::DateTime => "dateTime",
            AttributeType::Binary => "binary",
        }
    }
}

impl Default for AttributeType {
    fn default() -> Self {
        Self::String
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing layer an access limitation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    /// Raw resource schema layer
    Schema,
    /// Model (mapping and synchronization) layer
    Model,
    /// User-facing presentation layer
    Presentation,
}

/// Read/add/modify access for one layer. Unset values defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyLimitations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify: Option<bool>,
}

impl PropertyLimitations {
    /// Limitations that forbid every access.
    pub fn none_allowed() -> Self {
        Self {
            read: Some(false),
            add: Some(false),
            modify: Some(false),
        }
    }

    /// Field-wise merge where `self` wins when set.
    pub fn merged_over(&self, parent: &PropertyLimitations) -> PropertyLimitations {
        PropertyLimitations {
            read: self.read.or(parent.read),
            add: self.add.or(parent.add),
            modify: self.modify.or(parent.modify),
        }
    }
}

/// Merge two per-layer limitation maps, `child` entries winning field-wise.
pub fn merge_limitations(
    child: &BTreeMap<LayerType, PropertyLimitations>,
    parent: &BTreeMap<LayerType, PropertyLimitations>,
) -> BTreeMap<LayerType, PropertyLimitations> {
    let mut merged = parent.clone();
    for (layer, limitations) in child {
        let combined = match parent.get(layer) {
            Some(parent_limitations) => limitations.merged_over(parent_limitations),
            None => limitations.clone(),
        };
        merged.insert(*layer, combined);
    }
    merged
}

fn default_true() -> bool {
    true
}

fn default_max_occurs() -> i32 {
    1
}

/// Definition of a resource attribute.
///
/// `min_occurs >= 1` makes the attribute mandatory, `max_occurs == 1` makes it
/// single-valued and a negative `max_occurs` means unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAttributeDefinition {
    pub name: ItemName,
    #[serde(rename = "type", default)]
    pub value_type: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub min_occurs: u32,
    #[serde(default = "default_max_occurs")]
    pub max_occurs: i32,
    #[serde(default)]
    pub primary_identifier: bool,
    #[serde(default)]
    pub secondary_identifier: bool,
    #[serde(default = "default_true")]
    pub readable: bool,
    #[serde(default = "default_true")]
    pub creatable: bool,
    #[serde(default = "default_true")]
    pub updatable: bool,
    /// Whether values set directly on the resource are tolerated
    #[serde(default = "default_true")]
    pub tolerant: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub limitations: BTreeMap<LayerType, PropertyLimitations>,
}

impl ResourceAttributeDefinition {
    /// Create an optional, single-valued attribute definition.
    pub fn new(name: ItemName, value_type: AttributeType) -> Self {
        Self {
            name,
            value_type,
            native_name: None,
            display_name: None,
            min_occurs: 0,
            max_occurs: 1,
            primary_identifier: false,
            secondary_identifier: false,
            readable: true,
            creatable: true,
            updatable: true,
            tolerant: true,
            limitations: BTreeMap::new(),
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.min_occurs = 1;
        self
    }

    pub fn multi_valued(mut self) -> Self {
        self.max_occurs = -1;
        self
    }

    pub fn as_primary_identifier(mut self) -> Self {
        self.primary_identifier = true;
        self
    }

    pub fn as_secondary_identifier(mut self) -> Self {
        self.secondary_identifier = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.creatable = false;
        self.updatable = false;
        self
    }

    pub fn with_limitations(mut self, layer: LayerType, limitations: PropertyLimitations) -> Self {
        self.limitations.insert(layer, limitations);
        self
    }

    pub fn is_mandatory(&self) -> bool {
        self.min_occurs >= 1
    }

    pub fn is_single_valued(&self) -> bool {
        self.max_occurs == 1
    }

    pub fn is_multi_valued(&self) -> bool {
        !self.is_single_valued()
    }

    pub fn is_identifier(&self) -> bool {
        self.primary_identifier || self.secondary_identifier
    }

    pub fn can_read(&self, layer: LayerType) -> bool {
        self.limitation(layer, |l| l.read).unwrap_or(self.readable)
    }

    pub fn can_add(&self, layer: LayerType) -> bool {
        self.limitation(layer, |l| l.add).unwrap_or(self.creatable)
    }

    pub fn can_modify(&self, layer: LayerType) -> bool {
        self.limitation(layer, |l| l.modify).unwrap_or(self.updatable)
    }

    // Layer-specific value first, then the schema layer.
    fn limitation(
        &self,
        layer: LayerType,
        pick: impl Fn(&PropertyLimitations) -> Option<bool>,
    ) -> Option<bool> {
        self.limitations
            .get(&layer)
            .and_then(&pick)
            .or_else(|| self.limitations.get(&LayerType::Schema).and_then(&pick))
    }
}
