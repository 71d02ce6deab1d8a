//! Identifier, name and consistency utilities for shadows.
//!
//! Identifiers are interpreted through a [`ResourceObjectDefinition`]: the
//! shadow's attribute store does not know which of its attributes are primary
//! or secondary identifiers.

use super::attributes::ResourceAttribute;
use super::model::Shadow;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::{INTENT_DEFAULT, ItemName, ResourceObjectDefinition, ShadowKind};
use log::trace;

/// Attributes of the shadow that are primary identifiers.
///
/// `None` when the shadow has no attributes container at all.
pub fn primary_identifiers<'a>(
    shadow: &'a Shadow,
    definition: &ResourceObjectDefinition,
) -> Option<Vec<&'a ResourceAttribute>> {
    identifiers_matching(shadow, |name| definition.is_primary_identifier(name))
}

/// Attributes of the shadow that are secondary identifiers.
pub fn secondary_identifiers<'a>(
    shadow: &'a Shadow,
    definition: &ResourceObjectDefinition,
) -> Option<Vec<&'a ResourceAttribute>> {
    identifiers_matching(shadow, |name| definition.is_secondary_identifier(name))
}

/// Primary and secondary identifiers, primary first.
pub fn all_identifiers<'a>(
    shadow: &'a Shadow,
    definition: &ResourceObjectDefinition,
) -> Option<Vec<&'a ResourceAttribute>> {
    let mut identifiers = primary_identifiers(shadow, definition)?;
    if let Some(secondary) = secondary_identifiers(shadow, definition) {
        for attribute in secondary {
            if !identifiers.iter().any(|a| a.name.matches(&attribute.name)) {
                identifiers.push(attribute);
            }
        }
    }
    Some(identifiers)
}

fn identifiers_matching(
    shadow: &Shadow,
    predicate: impl Fn(&ItemName) -> bool,
) -> Option<Vec<&ResourceAttribute>> {
    let attributes = shadow.attributes.as_ref()?;
    Some(
        attributes
            .iter()
            .filter(|attribute| predicate(&attribute.name))
            .collect(),
    )
}

/// Determine the name of a shadow, falling back to `icfs:name`.
///
/// See [`determine_shadow_name_with_fallback`].
pub fn determine_shadow_name(
    shadow: &Shadow,
    definition: &ResourceObjectDefinition,
) -> SchemaResult<Option<String>> {
    determine_shadow_name_with_fallback(shadow, definition, &ItemName::icfs_name())
}

/// Determine the name of a shadow.
///
/// In order of preference: the single value of the naming attribute, then
/// the only primary identifier, which must hold a single string value. The
/// fallback attribute is consulted only when the shadow carries no primary
/// identifier or a composite one. More than one value of the naming or
/// fallback attribute is an error. Returns `None` when the shadow has no
/// attributes container.
pub fn determine_shadow_name_with_fallback(
    shadow: &Shadow,
    definition: &ResourceObjectDefinition,
    fallback: &ItemName,
) -> SchemaResult<Option<String>> {
    let Some(attributes) = shadow.attributes.as_ref() else {
        return Ok(None);
    };

    if let Some(naming) = definition.naming_attribute() {
        if let Some(attribute) = attributes.get(&naming.name) {
            match attribute.values.as_slice() {
                [] => {}
                [value] => return Ok(Some(value.to_string())),
                values => {
                    return Err(SchemaError::AmbiguousName {
                        attribute: naming.name.to_string(),
                        count: values.len(),
                    });
                }
            }
        }
    }

    let identifiers: Vec<&ResourceAttribute> = attributes
        .iter()
        .filter(|attribute| definition.is_primary_identifier(&attribute.name))
        .collect();
    if let [identifier] = identifiers.as_slice() {
        return match identifier.single_value().and_then(|v| v.as_str()) {
            Some(value) => Ok(Some(value.to_string())),
            None => Err(SchemaError::NoUsableName {
                definition: definition.describe(),
            }),
        };
    }

    if let Some(attribute) = attributes.get(fallback) {
        match attribute.values.as_slice() {
            [] => {}
            [value] => return Ok(Some(value.to_string())),
            values => {
                return Err(SchemaError::AmbiguousName {
                    attribute: fallback.to_string(),
                    count: values.len(),
                });
            }
        }
    }

    Err(SchemaError::NoUsableName {
        definition: definition.describe(),
    })
}

/// Set the shadow name when it is missing. Returns the name in effect.
pub fn ensure_shadow_name(
    shadow: &mut Shadow,
    definition: &ResourceObjectDefinition,
    fallback: &ItemName,
) -> SchemaResult<Option<String>> {
    if shadow.name.is_none() {
        shadow.name = determine_shadow_name_with_fallback(shadow, definition, fallback)?;
        trace!("Shadow name determined: {:?}", shadow.name);
    }
    Ok(shadow.name.clone())
}

/// String form of the primary identifier value, as indexed in the repository.
///
/// `None` when the definition has no primary identifier or the shadow carries
/// no value for it. Composite or multi-valued identifiers are an error.
pub fn determine_primary_identifier_value(
    shadow: &Shadow,
    definition: &ResourceObjectDefinition,
) -> SchemaResult<Option<String>> {
    let identifier = match definition.primary_identifiers().as_slice() {
        [] => return Ok(None),
        [identifier] => identifier.name.clone(),
        identifiers => {
            let names: Vec<String> = identifiers.iter().map(|i| i.name.to_string()).collect();
            return Err(SchemaError::UnusablePrimaryIdentifier {
                details: format!(
                    "composite primary identifier [{}] in {}",
                    names.join(", "),
                    definition.describe()
                ),
            });
        }
    };

    let Some(attribute) = shadow.attributes.as_ref().and_then(|a| a.get(&identifier)) else {
        return Ok(None);
    };
    match attribute.values.as_slice() {
        [] => Ok(None),
        [value] => Ok(Some(value.to_string())),
        values => Err(SchemaError::UnusablePrimaryIdentifier {
            details: format!("{} has {} values", identifier, values.len()),
        }),
    }
}

/// Validate the shadow's attributes against the definition.
pub fn validate_attribute_schema(
    shadow: &Shadow,
    definition: &ResourceObjectDefinition,
) -> SchemaResult<()> {
    match &shadow.attributes {
        Some(attributes) => definition.validate_attributes(attributes),
        None => Ok(()),
    }
}

/// Whether two shadows would represent the same object type on the same
/// resource, so that they cannot both be owned by one focus.
pub fn is_conflicting(a: &Shadow, b: &Shadow) -> bool {
    if a.resource_ref != b.resource_ref {
        return false;
    }
    let kind_a = a.kind.unwrap_or(ShadowKind::Account);
    let kind_b = b.kind.unwrap_or(ShadowKind::Account);
    kind_a == kind_b && intent_equals(a.intent.as_deref(), b.intent.as_deref())
}

/// Intent comparison where absent, blank and `default` are the same intent.
pub fn intent_equals(a: Option<&str>, b: Option<&str>) -> bool {
    fn canonical(intent: Option<&str>) -> &str {
        match intent.map(str::trim) {
            None | Some("") => INTENT_DEFAULT,
            Some(value) => value,
        }
    }
    canonical(a) == canonical(b)
}
