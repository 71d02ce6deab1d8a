//! Resource definitions and template expansion.
//!
//! This module contains the raw resource model as stored in the repository,
//! the merge rules of resource inheritance, the expander that walks a `super`
//! chain through a [`ResourceRepository`](crate::repository::ResourceRepository)
//! and content fingerprints of expanded resources.
//!
//! # Example
//!
//! ```rust
//! use shadow_provisioning::resource::{ResourceDefinition, merge_chain};
//! use shadow_provisioning::Oid;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let template = ResourceDefinition::new(Oid::new("template")?, "Template")
//!     .as_template()
//!     .with_connector_property("instanceId", json!("main"));
//! let resource = ResourceDefinition::new(Oid::new("resource")?, "Resource")
//!     .extending(Oid::new("template")?)
//!     .with_connector_property("supportValidity", json!(true));
//!
//! let expanded = merge_chain(&resource, &[template]);
//! assert_eq!(expanded.definition.connector_configuration["instanceId"], json!("main"));
//! assert_eq!(expanded.ancestor_oids, vec![Oid::new("template")?]);
//! # Ok(())
//! # }
//! ```

pub mod definition;
pub mod expansion;
pub mod fingerprint;
pub mod merge;

pub use definition::{
    AdditionalConnector, ConnectorConfiguration, NativeSchema, ResourceDefinition,
    ResourceSuperRef, SchemaHandling,
};
pub use expansion::{ExpandedResource, ResourceExpander, merge_chain};
pub use fingerprint::ContentFingerprint;
