//! The shadow: the local record of an object that lives on a resource.

use super::attributes::{AttributeValue, ShadowAttributes};
use super::lifecycle::ShadowLifecycleState;
use crate::oid::Oid;
use crate::schema::{INTENT_UNKNOWN, ItemName, ShadowKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Type of a pending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
}

/// Execution status of a pending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingOperationExecutionStatus {
    Requested,
    Executing,
    Completed,
}

/// An operation that was started against the resource but whose effect is not
/// (yet) reflected in the shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOperation {
    pub change_type: ChangeType,
    pub execution_status: PendingOperationExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_number: Option<u32>,
}

impl PendingOperation {
    pub fn new(change_type: ChangeType, execution_status: PendingOperationExecutionStatus) -> Self {
        Self {
            change_type,
            execution_status,
            request_timestamp: None,
            completion_timestamp: None,
            attempt_number: None,
        }
    }

    /// A requested, not yet executed operation.
    pub fn requested(change_type: ChangeType) -> Self {
        Self::new(change_type, PendingOperationExecutionStatus::Requested)
    }

    /// A completed operation.
    pub fn completed(change_type: ChangeType, completed_at: DateTime<Utc>) -> Self {
        Self {
            completion_timestamp: Some(completed_at),
            ..Self::new(change_type, PendingOperationExecutionStatus::Completed)
        }
    }

    pub fn is_completed(&self) -> bool {
        self.execution_status == PendingOperationExecutionStatus::Completed
    }
}

/// Correlation outcome of a shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncSituation {
    /// Shadow is linked to its owner
    Linked,
    /// An owner was found but the link does not exist yet
    Unlinked,
    /// No owner candidate was found
    Unmatched,
    /// More than one owner candidate matches
    Disputed,
    /// Shadow is linked to more than one owner
    Collision,
    /// The resource object was deleted
    Deleted,
}

impl SyncSituation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncSituation::Linked => "linked",
            SyncSituation::Unlinked => "unlinked",
            SyncSituation::Unmatched => "unmatched",
            SyncSituation::Disputed => "disputed",
            SyncSituation::Collision => "collision",
            SyncSituation::Deleted => "deleted",
        }
    }
}

impl fmt::Display for SyncSituation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncSituation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linked" => Ok(SyncSituation::Linked),
            "unlinked" => Ok(SyncSituation::Unlinked),
            "unmatched" => Ok(SyncSituation::Unmatched),
            "disputed" => Ok(SyncSituation::Disputed),
            "collision" => Ok(SyncSituation::Collision),
            "deleted" => Ok(SyncSituation::Deleted),
            _ => Err(format!("Unknown sync situation: {s}")),
        }
    }
}

/// Correlation state carried by a shadow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowCorrelationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<SyncSituation>,
    /// Candidate owners found by correlation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_options: Vec<Oid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resulting_owner: Option<Oid>,
    /// Correlator specific state, opaque to this crate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlator_state: Option<Value>,
}

/// Local record of a resource object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<Oid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_ref: Option<Oid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ShadowKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_class: Option<ItemName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auxiliary_object_classes: Vec<ItemName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<ShadowAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
    /// Computed lifecycle classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<ShadowLifecycleState>,
    /// Lifecycle of the object itself, e.g. `proposed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_lifecycle_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_operations: Vec<PendingOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_identifier_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<ShadowCorrelationState>,
}

impl Shadow {
    pub fn new() -> Self {
        Self::default()
    }

    /// A shadow on the given resource.
    pub fn for_resource(resource_oid: Oid) -> Self {
        Self {
            resource_ref: Some(resource_oid),
            ..Self::default()
        }
    }

    pub fn with_oid(mut self, oid: Oid) -> Self {
        self.oid = Some(oid);
        self
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

    pub fn with_auxiliary_object_class(mut self, object_class: ItemName) -> Self {
        self.auxiliary_object_classes.push(object_class);
        self
    }

    pub fn with_attributes(mut self, attributes: ShadowAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Add one attribute value, creating the attributes container if needed.
    pub fn with_attribute_value(mut self, name: ItemName, value: impl Into<AttributeValue>) -> Self {
        self.attributes
            .get_or_insert_with(ShadowAttributes::new)
            .add_value(name, value.into());
        self
    }

    pub fn with_pending_operation(mut self, operation: PendingOperation) -> Self {
        self.pending_operations.push(operation);
        self
    }

    pub fn with_dead(mut self, dead: bool) -> Self {
        self.dead = Some(dead);
        self
    }

    pub fn with_exists(mut self, exists: bool) -> Self {
        self.exists = Some(exists);
        self
    }

    pub fn resource_oid(&self) -> Option<&Oid> {
        self.resource_ref.as_ref()
    }

    /// Dead shadows record objects that are gone from the resource.
    pub fn is_dead(&self) -> bool {
        self.dead.unwrap_or(false)
    }

    /// Whether the object exists on the resource; absent means it does.
    pub fn exists(&self) -> bool {
        self.exists.unwrap_or(true)
    }

    /// Kind and intent are both set to something other than `unknown`.
    pub fn is_classified(&self) -> bool {
        let kind_known = self.kind.is_some_and(|kind| !kind.is_unknown());
        let intent_known = self
            .intent
            .as_deref()
            .is_some_and(|intent| intent != INTENT_UNKNOWN);
        kind_known && intent_known
    }

    pub fn correlation_situation(&self) -> Option<SyncSituation> {
        self.correlation.as_ref().and_then(|c| c.situation)
    }
}

impl fmt::Display for Shadow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shadow:{}({})",
            self.oid.as_ref().map(Oid::as_str).unwrap_or("-"),
            self.name.as_deref().unwrap_or("?")
        )
    }
}
