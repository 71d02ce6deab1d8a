//! Per-operation provisioning context.

use super::resource_manager::CompleteResource;
use super::task::Task;
use crate::config::ProvisioningConfig;
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::oid::Oid;
use crate::schema::{ItemName, ResourceObjectDefinition, ResourceSchema, ShadowKind};
use crate::shadow::{self, Shadow, ShadowLifecycleState};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Everything an operation on resource objects needs to know: the expanded
/// resource with its schema, the definition of the objects being handled
/// (if it could be determined) and the task.
///
/// Contexts are cheap to clone and never modified after creation; a context
/// for different objects on the same resource is derived via the spawn
/// methods of [`ProvisioningContextFactory`](super::ProvisioningContextFactory).
#[derive(Debug, Clone)]
pub struct ProvisioningContext {
    resource: Arc<CompleteResource>,
    definition: Option<Arc<ResourceObjectDefinition>>,
    task: Task,
    whole_class: Option<bool>,
    config: Arc<ProvisioningConfig>,
}

impl ProvisioningContext {
    pub(crate) fn new(
        resource: Arc<CompleteResource>,
        definition: Option<ResourceObjectDefinition>,
        task: Task,
        whole_class: Option<bool>,
        config: Arc<ProvisioningConfig>,
    ) -> Self {
        Self {
            resource,
            definition: definition.map(Arc::new),
            task,
            whole_class,
            config,
        }
    }

    pub fn resource(&self) -> &Arc<CompleteResource> {
        &self.resource
    }

    pub fn resource_oid(&self) -> &Oid {
        self.resource.oid()
    }

    pub fn schema(&self) -> &ResourceSchema {
        self.resource.schema()
    }

    /// The definition, if the context is not a wildcard context.
    pub fn definition(&self) -> Option<&ResourceObjectDefinition> {
        self.definition.as_deref()
    }

    /// The definition; its absence is an error of the calling code.
    pub fn definition_required(&self) -> ProvisioningResult<&ResourceObjectDefinition> {
        self.definition().ok_or_else(|| {
            ProvisioningError::illegal_state(format!(
                "No object definition in wildcard context for {}",
                self.resource.label()
            ))
        })
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    /// `Some(true)` for whole-class bulk operations, `Some(false)` for bulk
    /// operations on an object type, `None` when not applicable.
    pub fn whole_class(&self) -> Option<bool> {
        self.whole_class
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    pub fn is_wildcard(&self) -> bool {
        self.definition.is_none()
    }

    pub fn kind(&self) -> Option<ShadowKind> {
        self.definition().and_then(|d| d.kind())
    }

    pub fn intent(&self) -> Option<&str> {
        self.definition().and_then(|d| d.intent())
    }

    pub fn object_class_name(&self) -> Option<&ItemName> {
        self.definition().map(|d| d.object_class_name())
    }

    /// Name of a shadow according to this context's definition.
    pub fn determine_shadow_name(&self, shadow: &Shadow) -> ProvisioningResult<Option<String>> {
        let definition = self.definition_required()?;
        Ok(shadow::determine_shadow_name_with_fallback(
            shadow,
            definition,
            &self.config.naming_fallback_attribute,
        )?)
    }

    pub fn determine_primary_identifier_value(
        &self,
        shadow: &Shadow,
    ) -> ProvisioningResult<Option<String>> {
        let definition = self.definition_required()?;
        Ok(shadow::determine_primary_identifier_value(shadow, definition)?)
    }

    pub fn validate_shadow_attributes(&self, shadow: &Shadow) -> ProvisioningResult<()> {
        let definition = self.definition_required()?;
        Ok(shadow::validate_attribute_schema(shadow, definition)?)
    }

    /// Classify a shadow with the configured grace period.
    pub fn classify_shadow(&self, shadow: &mut Shadow, now: DateTime<Utc>) -> ShadowLifecycleState {
        shadow::classify(shadow, self.config.grace_period(), now)
    }
}

impl fmt::Display for ProvisioningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.definition {
            Some(definition) => write!(f, "ctx({}: {})", self.resource.label(), definition),
            None => write!(f, "ctx({}: wildcard)", self.resource.label()),
        }
    }
}
