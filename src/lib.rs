//! Shadow provisioning library for Rust.
//!
//! Interprets resource definitions and the shadows stored for the objects on
//! those resources: expands resource templates, resolves kind/intent/object
//! class coordinates to object definitions and classifies shadows.
//!
//! # Core Components
//!
//! - [`ResourceExpander`] - Template (`super`) chain expansion with cycle detection
//! - [`DefinitionResolver`] - Kind/intent/object class to definition resolution
//! - [`ProvisioningContextFactory`] - Per-operation contexts over cached, expanded resources
//! - [`shadow`] - Shadow naming, identifiers, conflicts and lifecycle classification
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shadow_provisioning::{
//!     InMemoryResourceRepository, OperationResult, ProvisioningConfig,
//!     ProvisioningContextFactory, Task,
//! };
//! use shadow_provisioning::schema::{ItemName, ShadowKind};
//! use shadow_provisioning::shadow::Shadow;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(InMemoryResourceRepository::new());
//! repository.load_directory("resources").await?;
//!
//! let factory = ProvisioningContextFactory::new(repository, ProvisioningConfig::default());
//! let shadow = Shadow::for_resource("10000000-0000-0000-0000-000000000004".parse()?)
//!     .with_kind(ShadowKind::Account)
//!     .with_object_class(ItemName::ri("AccountObjectClass"));
//!
//! let mut result = OperationResult::new("example");
//! let ctx = factory
//!     .create_for_shadow(&shadow, &[], &Task::with_generated_id(), &mut result)
//!     .await?;
//! println!("{}", ctx);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod oid;
pub mod repository;
pub mod resolver;
pub mod resource;
pub mod schema;
pub mod shadow;

// Re-export commonly used types for convenience
pub use config::{ProvisioningConfig, ProvisioningConfigBuilder};
pub use context::{
    CompleteResource, OperationResult, OperationResultStatus, ProvisioningContext,
    ProvisioningContextFactory, ResourceManager, Task,
};
pub use error::{
    ConfigurationError, ProvisioningError, ProvisioningResult, SchemaError, SchemaResult,
};
pub use oid::Oid;
pub use repository::{GetOperationOptions, InMemoryResourceRepository, ResourceRepository};
pub use resolver::{DefinitionResolver, ResolutionRequest};
pub use resource::{ExpandedResource, ResourceDefinition, ResourceExpander};
pub use schema::{ResourceObjectDefinition, ResourceSchema};
