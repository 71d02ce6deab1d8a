//! In-memory resource repository.
//!
//! Thread-safe implementation of [`ResourceRepository`] backed by a `HashMap`
//! behind a tokio `RwLock`. Every store of a resource bumps its version, which
//! is what the resource cache keys its validity on. Intended for tests, the
//! inspector binary and embedding scenarios without a real repository.
//!
//! # Example Usage
//!
//! ```rust
//! use shadow_provisioning::repository::{InMemoryResourceRepository, ResourceRepository};
//! use shadow_provisioning::resource::ResourceDefinition;
//! use shadow_provisioning::Oid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryResourceRepository::new();
//! let oid = Oid::new("resource-1")?;
//!
//! assert_eq!(repository.add_resource(ResourceDefinition::new(oid.clone(), "v1")).await, 1);
//! assert_eq!(repository.add_resource(ResourceDefinition::new(oid.clone(), "v2")).await, 2);
//! assert_eq!(repository.get_version(&oid).await?, 2);
//! # Ok(())
//! # }
//! ```

use super::{GetOperationOptions, ResourceRepository};
use crate::error::{ProvisioningError, ProvisioningResult};
use crate::oid::Oid;
use crate::resource::ResourceDefinition;
use log::{debug, info, trace};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredResource {
    definition: ResourceDefinition,
    version: u64,
}

/// Thread-safe in-memory resource repository.
#[derive(Clone, Default)]
pub struct InMemoryResourceRepository {
    data: Arc<RwLock<HashMap<Oid, StoredResource>>>,
    fetches: Arc<AtomicUsize>,
}

/// Statistics of the in-memory repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryRepositoryStats {
    pub resource_count: usize,
    pub template_count: usize,
    /// Number of `get_resource` calls served so far
    pub fetch_count: usize,
}

impl InMemoryResourceRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a resource, replacing any previous version. Returns the new version.
    pub async fn add_resource(&self, definition: ResourceDefinition) -> u64 {
        let mut data_guard = self.data.write().await;
        let version = data_guard
            .get(&definition.oid)
            .map(|stored| stored.version + 1)
            .unwrap_or(1);
        debug!("Storing resource {} as version {}", definition.label(), version);
        data_guard.insert(
            definition.oid.clone(),
            StoredResource {
                definition,
                version,
            },
        );
        version
    }

    /// Remove a resource. Returns whether it was present.
    pub async fn remove_resource(&self, oid: &Oid) -> bool {
        let mut data_guard = self.data.write().await;
        data_guard.remove(oid).is_some()
    }

    /// Parse and store a resource given as JSON.
    pub async fn add_resource_json(&self, json: &str) -> ProvisioningResult<Oid> {
        let definition: ResourceDefinition = serde_json::from_str(json)?;
        let oid = definition.oid.clone();
        self.add_resource(definition).await;
        Ok(oid)
    }

    /// Load every `*.json` file of a directory as a resource definition.
    pub async fn load_directory(&self, dir: impl AsRef<Path>) -> ProvisioningResult<Vec<Oid>> {
        let dir = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            ProvisioningError::repository(format!("Cannot read directory {}: {e}", dir.display()))
        })?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProvisioningError::repository(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = Vec::with_capacity(paths.len());
        for path in paths {
            let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
                ProvisioningError::repository(format!("Cannot read {}: {e}", path.display()))
            })?;
            loaded.push(self.add_resource_json(&content).await?);
        }
        info!("Loaded {} resources from {}", loaded.len(), dir.display());
        Ok(loaded)
    }

    /// All stored OIDs, sorted.
    pub async fn list_oids(&self) -> Vec<Oid> {
        let data_guard = self.data.read().await;
        let mut oids: Vec<Oid> = data_guard.keys().cloned().collect();
        oids.sort();
        oids
    }

    /// Get repository statistics for debugging and tests.
    pub async fn stats(&self) -> InMemoryRepositoryStats {
        let data_guard = self.data.read().await;
        InMemoryRepositoryStats {
            resource_count: data_guard.len(),
            template_count: data_guard
                .values()
                .filter(|stored| stored.definition.template)
                .count(),
            fetch_count: self.fetches.load(Ordering::Relaxed),
        }
    }

    /// Clear all data (useful for testing).
    pub async fn clear(&self) {
        let mut data_guard = self.data.write().await;
        data_guard.clear();
    }
}

impl ResourceRepository for InMemoryResourceRepository {
    async fn get_resource(
        &self,
        oid: &Oid,
        options: &GetOperationOptions,
    ) -> ProvisioningResult<ResourceDefinition> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        trace!("Fetching resource {} (read-only: {})", oid, options.read_only);
        let data_guard = self.data.read().await;
        let stored = data_guard
            .get(oid)
            .ok_or_else(|| ProvisioningError::resource_not_found(oid.as_str()))?;
        let mut definition = stored.definition.clone();
        definition.version = Some(stored.version.to_string());
        Ok(definition)
    }

    async fn get_version(&self, oid: &Oid) -> ProvisioningResult<u64> {
        let data_guard = self.data.read().await;
        data_guard
            .get(oid)
            .map(|stored| stored.version)
            .ok_or_else(|| ProvisioningError::resource_not_found(oid.as_str()))
    }
}
