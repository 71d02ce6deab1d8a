//! Shadows and the utilities that interpret them.
//!
//! A shadow is the local record of an object on a resource. This module holds
//! the shadow model with its attribute store, identifier and naming helpers,
//! lifecycle classification and the coordinates used to address sets of
//! shadows.

pub mod attributes;
pub mod coordinates;
pub mod identifiers;
pub mod lifecycle;
pub mod model;

pub use attributes::{AttributeValue, BinaryValue, ResourceAttribute, ShadowAttributes};
pub use coordinates::{ResourceShadowCoordinates, ShadowFilter, ShadowQuery};
pub use identifiers::{
    all_identifiers, determine_primary_identifier_value, determine_shadow_name,
    determine_shadow_name_with_fallback, ensure_shadow_name, intent_equals, is_conflicting,
    primary_identifiers, secondary_identifiers, validate_attribute_schema,
};
pub use lifecycle::{ShadowLifecycleState, classify, determine_lifecycle_state, is_gone};
pub use model::{
    ChangeType, PendingOperation, PendingOperationExecutionStatus, Shadow,
    ShadowCorrelationState, SyncSituation,
};
