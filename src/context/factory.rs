//! Creation of provisioning contexts.
//!
//! A context is created once per operation from whatever the caller has at
//! hand: explicit coordinates, a query, a stored shadow or an already known
//! definition. Contexts for further objects on the same resource are spawned
//! from an existing context without touching the repository again.

use super::operation_result::OperationResult;
use super::provisioning_context::ProvisioningContext;
use super::resource_manager::{CompleteResource, ResourceManager};
use super::task::Task;
use crate::config::ProvisioningConfig;
use crate::error::{ProvisioningError, ProvisioningResult, SchemaError};
use crate::oid::Oid;
use crate::repository::ResourceRepository;
use crate::resolver::{DefinitionResolver, ResolutionRequest};
use crate::schema::{INTENT_UNKNOWN, ItemName, ResourceObjectDefinition, ShadowKind};
use crate::shadow::{ResourceShadowCoordinates, Shadow, ShadowQuery};
use log::{debug, warn};
use std::sync::Arc;

const OP_CREATE_FOR_DEFINITION: &str = "ProvisioningContextFactory.createForDefinition";
const OP_CREATE_FOR_COORDINATES: &str = "ProvisioningContextFactory.createForCoordinates";
const OP_CREATE_FOR_BULK_OPERATION: &str = "ProvisioningContextFactory.createForBulkOperation";
const OP_CREATE_FOR_SHADOW: &str = "ProvisioningContextFactory.createForShadow";
const OP_SPAWN_FOR_KIND_INTENT: &str = "ProvisioningContextFactory.spawnForKindIntent";
const OP_SPAWN_FOR_OBJECT_CLASS: &str = "ProvisioningContextFactory.spawnForObjectClass";
const OP_SPAWN_FOR_SHADOW: &str = "ProvisioningContextFactory.spawnForShadow";

/// Builds [`ProvisioningContext`]s on top of a [`ResourceManager`].
pub struct ProvisioningContextFactory<R: ResourceRepository> {
    resource_manager: Arc<ResourceManager<R>>,
    resolver: DefinitionResolver,
    config: Arc<ProvisioningConfig>,
}

impl<R: ResourceRepository> ProvisioningContextFactory<R> {
    pub fn new(repository: Arc<R>, config: ProvisioningConfig) -> Self {
        let resource_manager = Arc::new(ResourceManager::new(repository, &config));
        Self::with_resource_manager(resource_manager, config)
    }

    /// Use a resource manager (and its cache) shared with other components.
    pub fn with_resource_manager(
        resource_manager: Arc<ResourceManager<R>>,
        config: ProvisioningConfig,
    ) -> Self {
        Self {
            resource_manager,
            resolver: DefinitionResolver::new(config.implicit_default_intent),
            config: Arc::new(config),
        }
    }

    pub fn resource_manager(&self) -> &Arc<ResourceManager<R>> {
        &self.resource_manager
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// Context for an already known definition.
    pub async fn create_for_definition(
        &self,
        resource_oid: &Oid,
        definition: ResourceObjectDefinition,
        task: &Task,
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        let result = parent_result.subresult(OP_CREATE_FOR_DEFINITION);
        let outcome = self
            .create_for_definition_internal(resource_oid, definition, task, result)
            .await;
        result.record_outcome(&outcome);
        outcome
    }

    /// Context for explicit coordinates. The `unknown` sentinels are rejected;
    /// coordinates without kind, intent and object class give a wildcard
    /// context.
    pub async fn create_for_coordinates(
        &self,
        coordinates: &ResourceShadowCoordinates,
        task: &Task,
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        let result = parent_result.subresult(OP_CREATE_FOR_COORDINATES);
        let outcome = self
            .create_for_coordinates_internal(coordinates, None, task, result)
            .await;
        result.record_outcome(&outcome);
        outcome
    }

    /// Context for a bulk operation (search, live sync, import) over the
    /// objects at the coordinates.
    pub async fn create_for_bulk_operation(
        &self,
        coordinates: &ResourceShadowCoordinates,
        task: &Task,
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        let result = parent_result.subresult(OP_CREATE_FOR_BULK_OPERATION);
        let outcome = self
            .create_for_coordinates_internal(coordinates, whole_class(coordinates), task, result)
            .await;
        result.record_outcome(&outcome);
        outcome
    }

    /// Context for a bulk operation described by a shadow query.
    pub async fn create_for_bulk_query(
        &self,
        query: &ShadowQuery,
        task: &Task,
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        let coordinates = match ResourceShadowCoordinates::from_query(query) {
            Ok(coordinates) => coordinates,
            Err(error) => {
                let error = ProvisioningError::from(error);
                parent_result
                    .subresult(OP_CREATE_FOR_BULK_OPERATION)
                    .record_fatal_error(&error);
                return Err(error);
            }
        };
        self.create_for_bulk_operation(&coordinates, task, parent_result)
            .await
    }

    /// Context for a stored shadow, interpreted with its own kind, intent
    /// and auxiliary classes plus `additional_auxiliary_classes`.
    pub async fn create_for_shadow(
        &self,
        shadow: &Shadow,
        additional_auxiliary_classes: &[ItemName],
        task: &Task,
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        let result = parent_result.subresult(OP_CREATE_FOR_SHADOW);
        let outcome = self
            .create_for_shadow_internal(shadow, additional_auxiliary_classes, task, result)
            .await;
        result.record_outcome(&outcome);
        outcome
    }

    async fn create_for_definition_internal(
        &self,
        resource_oid: &Oid,
        definition: ResourceObjectDefinition,
        task: &Task,
        result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        let resource = self
            .resource_manager
            .get_complete_resource(resource_oid, task, result)
            .await?;
        Ok(self.context(resource, Some(definition), task, None))
    }

    async fn create_for_coordinates_internal(
        &self,
        coordinates: &ResourceShadowCoordinates,
        whole_class: Option<bool>,
        task: &Task,
        result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        coordinates.check_not_unknown()?;
        let resource = self
            .resource_manager
            .get_complete_resource(&coordinates.resource_oid, task, result)
            .await?;
        let request = ResolutionRequest::from_coordinates(coordinates);
        let definition = self.resolve_optional(&resource, &request)?;
        debug!(
            "Created context for {} (whole class: {:?}) [task {}]",
            coordinates, whole_class, task.task_id
        );
        Ok(self.context(resource, definition, task, whole_class))
    }

    async fn create_for_shadow_internal(
        &self,
        shadow: &Shadow,
        additional_auxiliary_classes: &[ItemName],
        task: &Task,
        result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        check_for_partial_classification(shadow)?;
        let resource_oid = shadow.resource_oid().ok_or_else(|| {
            ProvisioningError::invalid_argument(format!("No resource reference in {shadow}"))
        })?;
        let resource = self
            .resource_manager
            .get_complete_resource(resource_oid, task, result)
            .await?;
        let request = ResolutionRequest::from_shadow(shadow)
            .with_auxiliary_object_classes(additional_auxiliary_classes.iter().cloned());
        let definition = self.resolver.resolve(resource.schema(), &request)?;
        debug!("Created context for {} with {}", shadow, definition);
        Ok(self.context(resource, Some(definition), task, None))
    }

    /// Context for another object type on the resource of `ctx`.
    pub fn spawn_for_kind_intent(
        &self,
        ctx: &ProvisioningContext,
        kind: ShadowKind,
        intent: &str,
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        let result = parent_result.subresult(OP_SPAWN_FOR_KIND_INTENT);
        let outcome = self.spawn_for_request(ctx, &ResolutionRequest::for_kind_intent(kind, intent));
        result.record_outcome(&outcome);
        outcome
    }

    /// Context for an object class (with auxiliary classes) on the resource
    /// of `ctx`.
    pub fn spawn_for_object_class(
        &self,
        ctx: &ProvisioningContext,
        object_class: &ItemName,
        auxiliary_object_classes: &[ItemName],
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        let result = parent_result.subresult(OP_SPAWN_FOR_OBJECT_CLASS);
        let request = ResolutionRequest::for_object_class(object_class.clone())
            .with_auxiliary_object_classes(auxiliary_object_classes.iter().cloned());
        let outcome = self.spawn_for_request(ctx, &request);
        result.record_outcome(&outcome);
        outcome
    }

    /// Context for a shadow on the resource of `ctx`.
    pub fn spawn_for_shadow(
        &self,
        ctx: &ProvisioningContext,
        shadow: &Shadow,
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<ProvisioningContext> {
        let result = parent_result.subresult(OP_SPAWN_FOR_SHADOW);
        let outcome = self.spawn_for_shadow_internal(ctx, shadow);
        result.record_outcome(&outcome);
        outcome
    }

    fn spawn_for_shadow_internal(
        &self,
        ctx: &ProvisioningContext,
        shadow: &Shadow,
    ) -> ProvisioningResult<ProvisioningContext> {
        if let Some(resource_oid) = shadow.resource_oid() {
            if resource_oid != ctx.resource_oid() {
                return Err(ProvisioningError::illegal_state(format!(
                    "Cannot spawn context for {} on resource {}: it belongs to resource {}",
                    shadow,
                    ctx.resource_oid(),
                    resource_oid
                )));
            }
        }
        check_for_partial_classification(shadow)?;
        self.spawn_for_request(ctx, &ResolutionRequest::from_shadow(shadow))
    }

    fn spawn_for_request(
        &self,
        ctx: &ProvisioningContext,
        request: &ResolutionRequest,
    ) -> ProvisioningResult<ProvisioningContext> {
        let definition = self.resolver.resolve(ctx.schema(), request)?;
        debug!("Spawned context for {} from {}", definition, ctx);
        Ok(self.spawn(ctx, definition))
    }

    fn resolve_optional(
        &self,
        resource: &CompleteResource,
        request: &ResolutionRequest,
    ) -> ProvisioningResult<Option<ResourceObjectDefinition>> {
        if request.is_empty() {
            return Ok(None);
        }
        self.resolver.resolve(resource.schema(), request).map(Some)
    }

    /// The spawned context of a bulk context stays a bulk context, with the
    /// flag following the new definition.
    fn spawn(&self, ctx: &ProvisioningContext, definition: ResourceObjectDefinition) -> ProvisioningContext {
        let whole_class = ctx
            .whole_class()
            .map(|_| definition.is_object_class_definition());
        self.context(
            Arc::clone(ctx.resource()),
            Some(definition),
            ctx.task(),
            whole_class,
        )
    }

    fn context(
        &self,
        resource: Arc<CompleteResource>,
        definition: Option<ResourceObjectDefinition>,
        task: &Task,
        whole_class: Option<bool>,
    ) -> ProvisioningContext {
        ProvisioningContext::new(
            resource,
            definition,
            task.clone(),
            whole_class,
            Arc::clone(&self.config),
        )
    }
}

fn whole_class(coordinates: &ResourceShadowCoordinates) -> Option<bool> {
    match (coordinates.kind, &coordinates.object_class) {
        (Some(_), _) => Some(false),
        (None, Some(_)) if coordinates.intent.is_none() => Some(true),
        _ => None,
    }
}

/// Reject shadows whose classification cannot be interpreted.
///
/// A shadow needs an object class, and an intent is meaningless without a
/// kind. A kind without intent is accepted: it resolves to the default
/// type of the kind.
pub fn check_for_partial_classification(shadow: &Shadow) -> ProvisioningResult<()> {
    if shadow.object_class.is_none() {
        return Err(SchemaError::partial_classification(format!(
            "{shadow} has no object class"
        ))
        .into());
    }

    let kind_known = shadow.kind.is_some_and(|kind| !kind.is_unknown());
    let intent = shadow
        .intent
        .as_deref()
        .filter(|intent| !intent.trim().is_empty());

    match intent {
        Some(intent) if intent != INTENT_UNKNOWN && !kind_known => {
            Err(SchemaError::partial_classification(format!(
                "{shadow} has intent '{intent}' but no kind"
            ))
            .into())
        }
        None if kind_known => {
            warn!(
                "{} has kind {:?} but no intent, using the default type of the kind",
                shadow, shadow.kind
            );
            Ok(())
        }
        _ => Ok(()),
    }
}
