//! Shadow lifecycle classification.
//!
//! The lifecycle state is derived from the `dead` and `exists` flags, the
//! object lifecycle state and the pending operations of a shadow:
//!
//! ```text
//!  proposed ─▶ conceived ─▶ gestating ─▶ live ─▶ reaping ─▶ corpse ─▶ tombstone
//! ```
//!
//! Completed pending operations keep influencing the state for the configured
//! grace period. Classification never deletes shadows; it only labels them.

use super::model::{ChangeType, PendingOperation, Shadow};
use crate::error::{ProvisioningError, ProvisioningResult};
use chrono::{DateTime, Duration, Utc};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of `objectLifecycleState` marking a proposed object.
pub const OBJECT_LIFECYCLE_PROPOSED: &str = "proposed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowLifecycleState {
    /// Object only proposed, nothing was attempted on the resource
    Proposed,
    /// Shadow created, object not yet on the resource
    Conceived,
    /// Add operation in progress
    Gestating,
    Live,
    /// Delete operation in progress
    Reaping,
    /// Object deleted, shadow kept for the grace period
    Corpse,
    /// Object deleted, shadow kept as a record only
    Tombstone,
}

impl ShadowLifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Conceived => "conceived",
            Self::Gestating => "gestating",
            Self::Live => "live",
            Self::Reaping => "reaping",
            Self::Corpse => "corpse",
            Self::Tombstone => "tombstone",
        }
    }

    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Corpse | Self::Tombstone)
    }
}

impl fmt::Display for ShadowLifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the lifecycle state of a shadow at `now`.
pub fn determine_lifecycle_state(
    shadow: &Shadow,
    grace_period: Duration,
    now: DateTime<Utc>,
) -> ShadowLifecycleState {
    if shadow.object_lifecycle_state.as_deref() == Some(OBJECT_LIFECYCLE_PROPOSED) {
        return ShadowLifecycleState::Proposed;
    }
    let pending_in_grace =
        |change_type| has_pending_operation(shadow, change_type, grace_period, now);

    if shadow.is_dead() {
        if pending_in_grace(ChangeType::Delete) {
            ShadowLifecycleState::Corpse
        } else {
            ShadowLifecycleState::Tombstone
        }
    } else if shadow.exists() {
        if pending_in_grace(ChangeType::Delete) {
            ShadowLifecycleState::Reaping
        } else {
            ShadowLifecycleState::Live
        }
    } else if pending_in_grace(ChangeType::Add) {
        ShadowLifecycleState::Gestating
    } else {
        ShadowLifecycleState::Conceived
    }
}

/// Compute the lifecycle state and store it into the shadow.
pub fn classify(
    shadow: &mut Shadow,
    grace_period: Duration,
    now: DateTime<Utc>,
) -> ShadowLifecycleState {
    let state = determine_lifecycle_state(shadow, grace_period, now);
    trace!("Shadow {} classified as {}", shadow, state);
    shadow.lifecycle_state = Some(state);
    state
}

/// Whether the shadow's object is gone from the resource.
///
/// Requires a classified shadow; see [`classify`].
pub fn is_gone(shadow: &Shadow) -> ProvisioningResult<bool> {
    shadow
        .lifecycle_state
        .map(|state| state.is_gone())
        .ok_or_else(|| {
            ProvisioningError::illegal_state(format!("Lifecycle state of {shadow} is not known"))
        })
}

/// Pending operation of the given type that is either still running or
/// completed less than `grace_period` ago.
pub fn has_pending_operation(
    shadow: &Shadow,
    change_type: ChangeType,
    grace_period: Duration,
    now: DateTime<Utc>,
) -> bool {
    shadow
        .pending_operations
        .iter()
        .filter(|op| op.change_type == change_type)
        .any(|op| is_within_grace(op, grace_period, now))
}

fn is_within_grace(operation: &PendingOperation, grace_period: Duration, now: DateTime<Utc>) -> bool {
    if !operation.is_completed() {
        return true;
    }
    match operation.completion_timestamp {
        Some(completed_at) => now - completed_at < grace_period,
        // completed without a timestamp: treated as long past
        None => false,
    }
}
