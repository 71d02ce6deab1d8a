//! Validation of shadow attribute values against a resource object definition.
//!
//! Checks performed for every attribute present in the container:
//! the attribute must be defined, a mandatory attribute that is present must
//! carry a value, single-valued attributes carry at most one value and each
//! value must be compatible with the declared type. Mandatory attributes that
//! are absent from the container altogether are not reported; shadows usually
//! hold only a subset of the resource object's attributes.

use super::definition::ResourceObjectDefinition;
use super::types::{AttributeType, ResourceAttributeDefinition};
use crate::error::{SchemaError, SchemaResult};
use crate::shadow::{AttributeValue, ShadowAttributes};

impl ResourceObjectDefinition {
    /// Validate an attributes container against this definition.
    pub fn validate_attributes(&self, attributes: &ShadowAttributes) -> SchemaResult<()> {
        for attribute in attributes.iter() {
            let definition = self
                .find_attribute_definition(&attribute.name)
                .ok_or_else(|| SchemaError::UnknownAttribute {
                    attribute: attribute.name.to_string(),
                    definition: self.describe(),
                })?;
            validate_attribute_values(definition, &attribute.values)?;
        }
        Ok(())
    }
}

/// Validate the values of one attribute against its definition.
pub fn validate_attribute_values(
    definition: &ResourceAttributeDefinition,
    values: &[AttributeValue],
) -> SchemaResult<()> {
    if values.is_empty() {
        if definition.is_mandatory() {
            return Err(SchemaError::MissingMandatoryAttribute {
                attribute: definition.name.to_string(),
            });
        }
        return Ok(());
    }

    if definition.is_single_valued() && values.len() > 1 {
        return Err(SchemaError::MultipleValues {
            attribute: definition.name.to_string(),
            count: values.len(),
        });
    }

    for value in values {
        if !is_compatible(definition.value_type, value) {
            return Err(SchemaError::IncompatibleValueType {
                attribute: definition.name.to_string(),
                expected: definition.value_type.to_string(),
                actual: value.type_name().to_string(),
            });
        }
    }
    Ok(())
}

/// Whether a runtime value can represent the declared attribute type.
pub fn is_compatible(value_type: AttributeType, value: &AttributeValue) -> bool {
    match (value_type, value) {
        (AttributeType::String, AttributeValue::String(_)) => true,
        (AttributeType::Int, AttributeValue::Integer(n)) => i32::try_from(*n).is_ok(),
        (AttributeType::Long, AttributeValue::Integer(_)) => true,
        (AttributeType::Boolean, AttributeValue::Boolean(_)) => true,
        (AttributeType::Decimal, AttributeValue::Decimal(_) | AttributeValue::Integer(_)) => true,
        (AttributeType::DateTime, AttributeValue::DateTime(_)) => true,
        (AttributeType::Binary, AttributeValue::Binary(_)) => true,
        _ => false,
    }
}
