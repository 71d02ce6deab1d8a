//! Resolution of kind/intent/object class coordinates to a definition.
//!
//! Given the schema of a resource and a [`ResolutionRequest`], the
//! [`DefinitionResolver`] finds the [`ResourceObjectDefinition`] that governs
//! the addressed objects:
//!
//! - kind and intent select an object type;
//! - kind alone selects the default type of that kind;
//! - an object class alone selects the raw object class definition;
//! - the `unknown` sentinels are accepted only for stored shadows, which then
//!   get the definition of their object class.
//!
//! Ambiguity is always an error; the resolver never picks the first match.

use crate::error::{ProvisioningError, ProvisioningResult, SchemaError};
use crate::schema::{
    INTENT_UNKNOWN, ItemName, ResourceObjectDefinition, ResourceObjectTypeDefinition,
    ResourceSchema, ShadowKind,
};
use crate::shadow::{ResourceShadowCoordinates, Shadow};
use log::{debug, trace};
use std::fmt;
use std::sync::Arc;

/// What to resolve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionRequest {
    pub kind: Option<ShadowKind>,
    pub intent: Option<String>,
    pub object_class: Option<ItemName>,
    pub auxiliary_object_classes: Vec<ItemName>,
    /// Accept the `unknown` sentinels (only when deriving from a stored shadow)
    pub unknown_allowed: bool,
}

impl ResolutionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_kind_intent(kind: ShadowKind, intent: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            intent: Some(intent.into()),
            ..Self::default()
        }
    }

    pub fn for_object_class(object_class: ItemName) -> Self {
        Self {
            object_class: Some(object_class),
            ..Self::default()
        }
    }

    pub fn from_coordinates(coordinates: &ResourceShadowCoordinates) -> Self {
        Self {
            kind: coordinates.kind,
            intent: coordinates.intent.clone(),
            object_class: coordinates.object_class.clone(),
            ..Self::default()
        }
    }

    /// Request for interpreting a stored shadow, including its auxiliary classes.
    pub fn from_shadow(shadow: &Shadow) -> Self {
        Self {
            kind: shadow.kind,
            intent: shadow.intent.clone(),
            object_class: shadow.object_class.clone(),
            auxiliary_object_classes: shadow.auxiliary_object_classes.clone(),
            unknown_allowed: true,
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

    pub fn with_auxiliary_object_classes(
        mut self,
        auxiliary: impl IntoIterator<Item = ItemName>,
    ) -> Self {
        for name in auxiliary {
            if !self.auxiliary_object_classes.iter().any(|n| n.matches(&name)) {
                self.auxiliary_object_classes.push(name);
            }
        }
        self
    }

    pub fn allow_unknown(mut self) -> Self {
        self.unknown_allowed = true;
        self
    }

    /// Intent with blank values treated as absent.
    pub fn effective_intent(&self) -> Option<&str> {
        self.intent.as_deref().filter(|intent| !intent.trim().is_empty())
    }

    /// Neither kind, intent nor object class is given.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.effective_intent().is_none() && self.object_class.is_none()
    }

    fn has_unknown(&self) -> bool {
        self.kind.is_some_and(|kind| kind.is_unknown())
            || self.effective_intent() == Some(INTENT_UNKNOWN)
    }
}

impl fmt::Display for ResolutionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(kind) = self.kind {
            parts.push(format!("kind={kind}"));
        }
        if let Some(intent) = &self.intent {
            parts.push(format!("intent={intent}"));
        }
        if let Some(object_class) = &self.object_class {
            parts.push(format!("objectClass={object_class}"));
        }
        if parts.is_empty() {
            f.write_str("<nothing>")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Resolves requests against a resource schema.
#[derive(Debug, Clone)]
pub struct DefinitionResolver {
    implicit_default_intent: bool,
}

impl Default for DefinitionResolver {
    fn default() -> Self {
        Self {
            implicit_default_intent: true,
        }
    }
}

impl DefinitionResolver {
    pub fn new(implicit_default_intent: bool) -> Self {
        Self {
            implicit_default_intent,
        }
    }

    /// Resolve the definition for a request.
    pub fn resolve(
        &self,
        schema: &ResourceSchema,
        request: &ResolutionRequest,
    ) -> ProvisioningResult<ResourceObjectDefinition> {
        trace!("Resolving {} in {}", request, schema.resource_label());

        if request.has_unknown() && !request.unknown_allowed {
            return Err(ProvisioningError::invalid_argument(format!(
                "The 'unknown' kind or intent is not allowed here: {request}"
            )));
        }

        let definition = if request.has_unknown() {
            // unclassified stored shadow: interpret by its object class
            let object_class = request.object_class.as_ref().ok_or_else(|| {
                SchemaError::partial_classification(format!(
                    "unclassified shadow without object class: {request}"
                ))
            })?;
            self.class_definition(schema, object_class)?
        } else {
            match (request.kind, request.effective_intent(), &request.object_class) {
                (None, Some(intent), _) => {
                    return Err(ProvisioningError::invalid_argument(format!(
                        "Intent '{intent}' specified without kind"
                    )));
                }
                (Some(kind), Some(intent), object_class) => {
                    let object_type = self.type_for_kind_intent(schema, request, kind, intent)?;
                    check_type_class(schema, request, &object_type, object_class.as_ref())?;
                    type_definition(schema, request, &object_type)?
                }
                (Some(kind), None, object_class) => {
                    let object_type =
                        self.default_type_for_kind(schema, request, kind, object_class.as_ref())?;
                    type_definition(schema, request, &object_type)?
                }
                (None, None, Some(object_class)) => self.class_definition(schema, object_class)?,
                (None, None, None) => {
                    return Err(ProvisioningError::invalid_argument(
                        "Neither kind, intent nor object class specified",
                    ));
                }
            }
        };

        let definition = add_auxiliary_classes(schema, definition, &request.auxiliary_object_classes)?;
        debug!(
            "Resolved {} to {} in {}",
            request,
            definition,
            schema.resource_label()
        );
        Ok(definition)
    }

    fn class_definition(
        &self,
        schema: &ResourceSchema,
        object_class: &ItemName,
    ) -> ProvisioningResult<ResourceObjectDefinition> {
        schema.object_class_definition(object_class).ok_or_else(|| {
            SchemaError::UnknownObjectClass {
                resource: schema.resource_label().to_string(),
                object_class: object_class.to_string(),
            }
            .into()
        })
    }

    fn type_for_kind_intent(
        &self,
        schema: &ResourceSchema,
        request: &ResolutionRequest,
        kind: ShadowKind,
        intent: &str,
    ) -> ProvisioningResult<Arc<ResourceObjectTypeDefinition>> {
        schema
            .find_object_type(kind, intent)
            .cloned()
            .ok_or_else(|| no_match(schema, request))
    }

    fn default_type_for_kind(
        &self,
        schema: &ResourceSchema,
        request: &ResolutionRequest,
        kind: ShadowKind,
        object_class: Option<&ItemName>,
    ) -> ProvisioningResult<Arc<ResourceObjectTypeDefinition>> {
        let candidates: Vec<&Arc<ResourceObjectTypeDefinition>> = schema
            .object_types_for_kind(kind)
            .into_iter()
            .filter(|t| object_class.is_none_or(|class| t.object_class().matches(class)))
            .collect();
        let defaults: Vec<&Arc<ResourceObjectTypeDefinition>> = candidates
            .iter()
            .copied()
            .filter(|t| t.is_default_for_kind())
            .collect();

        match defaults.as_slice() {
            [default] => return Ok(Arc::clone(default)),
            [] => {}
            many => {
                return Err(SchemaError::AmbiguousDefinition {
                    resource: schema.resource_label().to_string(),
                    coordinates: request.to_string(),
                    candidates: many.iter().map(|t| t.identifier()).collect(),
                }
                .into());
            }
        }

        match candidates.as_slice() {
            [only] if self.implicit_default_intent => {
                trace!("Using {} as implicit default for kind {}", only, kind);
                Ok(Arc::clone(only))
            }
            _ => Err(no_match(schema, request)),
        }
    }
}

fn no_match(schema: &ResourceSchema, request: &ResolutionRequest) -> ProvisioningError {
    SchemaError::no_matching_definition(schema.resource_label(), request.to_string()).into()
}

fn check_type_class(
    schema: &ResourceSchema,
    request: &ResolutionRequest,
    object_type: &ResourceObjectTypeDefinition,
    object_class: Option<&ItemName>,
) -> ProvisioningResult<()> {
    match object_class {
        Some(class) if !object_type.object_class().matches(class) => {
            Err(no_match(schema, request))
        }
        _ => Ok(()),
    }
}

fn type_definition(
    schema: &ResourceSchema,
    request: &ResolutionRequest,
    object_type: &Arc<ResourceObjectTypeDefinition>,
) -> ProvisioningResult<ResourceObjectDefinition> {
    schema
        .definition_for_type(object_type)
        .ok_or_else(|| no_match(schema, request))
}

fn add_auxiliary_classes(
    schema: &ResourceSchema,
    definition: ResourceObjectDefinition,
    auxiliary: &[ItemName],
) -> ProvisioningResult<ResourceObjectDefinition> {
    if auxiliary.is_empty() {
        return Ok(definition);
    }
    let classes = auxiliary
        .iter()
        .map(|name| {
            schema.find_object_class(name).cloned().ok_or_else(|| {
                ProvisioningError::from(SchemaError::UnknownObjectClass {
                    resource: schema.resource_label().to_string(),
                    object_class: name.to_string(),
                })
            })
        })
        .collect::<ProvisioningResult<Vec<_>>>()?;
    Ok(definition.with_auxiliary_object_classes(classes))
}
