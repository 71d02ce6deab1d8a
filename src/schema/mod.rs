//! Resource schema model.
//!
//! The schema of a resource consists of the object classes exposed by the
//! connector and the object types defined in the resource's schema handling.
//! Both are parsed from the expanded resource into an immutable
//! [`ResourceSchema`], from which [`ResourceObjectDefinition`]s are derived.
//!
//! # Key Types
//!
//! - [`ItemName`] - qualified names of classes and attributes
//! - [`ResourceAttributeDefinition`] - attribute type, multiplicity and identifier flags
//! - [`ObjectClassDefinition`] - native object class
//! - [`ResourceObjectTypeDefinition`] - kind/intent refinement of an object class
//! - [`ResourceObjectDefinition`] - the definition a shadow is interpreted with
//!
//! # Examples
//!
//! ```rust
//! use shadow_provisioning::schema::{
//!     AttributeType, ItemName, ObjectClassDefinition, ObjectTypeBean,
//!     ResourceAttributeDefinition, ResourceSchema, ShadowKind,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let account_class = ObjectClassDefinition::new(ItemName::ri("AccountObjectClass"))
//!     .with_attribute(
//!         ResourceAttributeDefinition::new(ItemName::icfs_uid(), AttributeType::String)
//!             .as_primary_identifier(),
//!     );
//! let schema = ResourceSchema::new(
//!     "dummy",
//!     vec![account_class],
//!     vec![ObjectTypeBean::new(ShadowKind::Account, "default")
//!         .with_object_class(ItemName::ri("AccountObjectClass"))
//!         .as_default()],
//! )?;
//! assert!(schema.default_object_type(ShadowKind::Account).is_some());
//! # Ok(())
//! # }
//! ```

pub mod definition;
pub mod object_class;
pub mod object_type;
pub mod resource_schema;
pub mod types;
pub mod validation;


// Re-export the main types for convenience
pub use definition::ResourceObjectDefinition;
pub use object_class::ObjectClassDefinition;
pub use object_type::{
    AttributeRefinement, ObjectTypeBean, ObjectTypeSuperRef, ResourceObjectTypeDefinition,
};
pub use resource_schema::ResourceSchema;
pub use types::{
    AttributeType, INTENT_DEFAULT, INTENT_UNKNOWN, ItemName, LayerType, PropertyLimitations,
    ResourceAttributeDefinition, ShadowKind, is_unknown_intent, normalize_intent,
};
