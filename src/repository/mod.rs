//! Read access to resource definitions.
//!
//! The provisioning core never writes resources. All it needs is to fetch a
//! resource by OID (read-only, since expansion works on clones) and to learn
//! the current version of a stored resource so that cached expansions can be
//! invalidated when a resource or one of its ancestors changes.
//!
//! # Example Usage
//!
//! ```rust
//! use shadow_provisioning::repository::{
//!     GetOperationOptions, InMemoryResourceRepository, ResourceRepository,
//! };
//! use shadow_provisioning::resource::ResourceDefinition;
//! use shadow_provisioning::Oid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryResourceRepository::new();
//! let oid = Oid::new("resource-1")?;
//! repository.add_resource(ResourceDefinition::new(oid.clone(), "Dummy")).await;
//!
//! let fetched = repository
//!     .get_resource(&oid, &GetOperationOptions::create_read_only())
//!     .await?;
//! assert_eq!(fetched.name, "Dummy");
//! # Ok(())
//! # }
//! ```

pub mod in_memory;

pub use in_memory::{InMemoryRepositoryStats, InMemoryResourceRepository};

use crate::error::ProvisioningResult;
use crate::oid::Oid;
use crate::resource::ResourceDefinition;
use std::future::Future;

/// Options of a repository read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOperationOptions {
    /// The caller will not modify the returned object
    pub read_only: bool,
}

impl GetOperationOptions {
    pub fn create_read_only() -> Self {
        Self { read_only: true }
    }
}

/// Source of resource definitions.
///
/// Implementations must report a missing object as
/// [`ProvisioningError::ObjectNotFound`](crate::error::ProvisioningError::ObjectNotFound).
pub trait ResourceRepository: Send + Sync {
    /// Fetch a resource by OID. The returned definition carries its
    /// repository version in `version`; cached expansions are only reused
    /// while those versions are current.
    fn get_resource(
        &self,
        oid: &Oid,
        options: &GetOperationOptions,
    ) -> impl Future<Output = ProvisioningResult<ResourceDefinition>> + Send;

    /// Current version of a stored resource.
    fn get_version(&self, oid: &Oid) -> impl Future<Output = ProvisioningResult<u64>> + Send;
}
