//! Attribute value store of a shadow.
//!
//! Values are kept as a small tagged union. The store itself knows nothing
//! about attribute types: whether `42` is an `int` or a `long` is decided by
//! the [`ResourceObjectDefinition`](crate::schema::ResourceObjectDefinition)
//! the shadow is interpreted with.
//!
//! In JSON the attributes container is a map from attribute name to the list
//! of its values:
//!
//! ```json
//! { "icfs:name": ["jack"], "ri:mail": ["jack@example.com", "jack@example.org"] }
//! ```

use crate::schema::ItemName;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Binary attribute value, written as `{"$binary": "<base64>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryValue(pub Vec<u8>);

#[derive(Serialize, Deserialize)]
struct BinaryRepr {
    #[serde(rename = "$binary")]
    data: String,
}

impl Serialize for BinaryValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        BinaryRepr {
            data: BASE64.encode(&self.0),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BinaryValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = BinaryRepr::deserialize(deserializer)?;
        BASE64
            .decode(repr.data.as_bytes())
            .map(BinaryValue)
            .map_err(serde::de::Error::custom)
    }
}

/// A single attribute value.
///
/// Deserialization tries the variants in declaration order, so strings in
/// RFC 3339 form become [`AttributeValue::DateTime`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    DateTime(DateTime<Utc>),
    String(String),
    Binary(BinaryValue),
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Binary(BinaryValue(bytes.into()))
    }

    /// Name of the runtime variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::DateTime(_) => "dateTime",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::DateTime(value) => f.write_str(&value.to_rfc3339()),
            Self::String(value) => f.write_str(value),
            Self::Binary(value) => f.write_str(&BASE64.encode(&value.0)),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

/// One attribute of a shadow with all of its values.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceAttribute {
    pub name: ItemName,
    pub values: Vec<AttributeValue>,
}

impl ResourceAttribute {
    pub fn new(name: ItemName, values: Vec<AttributeValue>) -> Self {
        Self { name, values }
    }

    /// The only value, or `None` when the attribute has zero or several values.
    pub fn single_value(&self) -> Option<&AttributeValue> {
        match self.values.as_slice() {
            [value] => Some(value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The attributes container of a shadow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<AttributeValue>>",
    into = "BTreeMap<String, Vec<AttributeValue>>"
)]
pub struct ShadowAttributes {
    attributes: Vec<ResourceAttribute>,
}

impl ShadowAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`add_value`](Self::add_value).
    pub fn with_value(mut self, name: ItemName, value: impl Into<AttributeValue>) -> Self {
        self.add_value(name, value.into());
        self
    }

    /// Builder-style variant of [`set_values`](Self::set_values).
    pub fn with_values(mut self, name: ItemName, values: Vec<AttributeValue>) -> Self {
        self.set_values(name, values);
        self
    }

    /// Append a value, creating the attribute when missing.
    pub fn add_value(&mut self, name: ItemName, value: AttributeValue) {
        match self.attributes.iter_mut().find(|a| a.name.matches(&name)) {
            Some(attribute) => attribute.values.push(value),
            None => self
                .attributes
                .push(ResourceAttribute::new(name, vec![value])),
        }
    }

    /// Replace all values of an attribute.
    pub fn set_values(&mut self, name: ItemName, values: Vec<AttributeValue>) {
        match self.attributes.iter_mut().find(|a| a.name.matches(&name)) {
            Some(attribute) => attribute.values = values,
            None => self.attributes.push(ResourceAttribute::new(name, values)),
        }
    }

    pub fn remove(&mut self, name: &ItemName) -> Option<ResourceAttribute> {
        let index = self.attributes.iter().position(|a| a.name.matches(name))?;
        Some(self.attributes.remove(index))
    }

    pub fn get(&self, name: &ItemName) -> Option<&ResourceAttribute> {
        self.attributes.iter().find(|a| a.name.matches(name))
    }

    pub fn values(&self, name: &ItemName) -> Option<&[AttributeValue]> {
        self.get(name).map(|a| a.values.as_slice())
    }

    pub fn contains(&self, name: &ItemName) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceAttribute> {
        self.attributes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &ItemName> {
        self.attributes.iter().map(|a| &a.name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl TryFrom<BTreeMap<String, Vec<AttributeValue>>> for ShadowAttributes {
    type Error = String;

    fn try_from(map: BTreeMap<String, Vec<AttributeValue>>) -> Result<Self, Self::Error> {
        let attributes = map
            .into_iter()
            .map(|(name, values)| Ok(ResourceAttribute::new(name.parse()?, values)))
            .collect::<Result<Vec<_>, String>>()?;
        Ok(Self { attributes })
    }
}

impl From<ShadowAttributes> for BTreeMap<String, Vec<AttributeValue>> {
    fn from(attributes: ShadowAttributes) -> Self {
        attributes
            .attributes
            .into_iter()
            .map(|attribute| (attribute.name.to_string(), attribute.values))
            .collect()
    }
}

impl FromIterator<ResourceAttribute> for ShadowAttributes {
    fn from_iter<T: IntoIterator<Item = ResourceAttribute>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}
