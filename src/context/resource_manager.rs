//! Loading, expanding and caching of complete resources.
//!
//! A [`CompleteResource`] is a resource with templates expanded, its schema
//! parsed and a content fingerprint computed. Building one is the expensive
//! part of creating a provisioning context, so results are cached per OID.
//! A cache entry stays valid while the repository versions of the resource
//! and of all of its ancestors are unchanged.

use super::operation_result::OperationResult;
use super::task::Task;
use crate::config::ProvisioningConfig;
use crate::error::{ConfigurationError, ProvisioningResult};
use crate::oid::Oid;
use crate::repository::{GetOperationOptions, ResourceRepository};
use crate::resource::{ContentFingerprint, ExpandedResource, ResourceDefinition, ResourceExpander};
use crate::schema::ResourceSchema;
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const OP_GET_COMPLETE_RESOURCE: &str = "ResourceManager.getCompleteResource";

/// An expanded resource with its parsed schema.
#[derive(Debug)]
pub struct CompleteResource {
    expanded: ExpandedResource,
    schema: Arc<ResourceSchema>,
    fingerprint: ContentFingerprint,
}

impl CompleteResource {
    /// Build from an already expanded resource.
    pub fn from_expanded(expanded: ExpandedResource) -> ProvisioningResult<Self> {
        let schema = ResourceSchema::from_resource(&expanded.definition)?;
        let fingerprint = ContentFingerprint::of_resource(&expanded.definition)?;
        Ok(Self {
            expanded,
            schema: Arc::new(schema),
            fingerprint,
        })
    }

    pub fn oid(&self) -> &Oid {
        &self.expanded.definition.oid
    }

    pub fn definition(&self) -> &ResourceDefinition {
        &self.expanded.definition
    }

    pub fn ancestor_oids(&self) -> &[Oid] {
        &self.expanded.ancestor_oids
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn fingerprint(&self) -> &ContentFingerprint {
        &self.fingerprint
    }

    pub fn label(&self) -> String {
        self.expanded.definition.label()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    resource: Arc<CompleteResource>,
    /// Versions of the resource and its ancestors as fetched; `None` when the
    /// repository did not report one
    versions: Vec<(Oid, Option<u64>)>,
}

/// Provides complete resources, expanding and caching them on demand.
pub struct ResourceManager<R: ResourceRepository> {
    repository: Arc<R>,
    expander: ResourceExpander<R>,
    cache: RwLock<HashMap<Oid, CacheEntry>>,
    cache_enabled: bool,
}

impl<R: ResourceRepository> ResourceManager<R> {
    pub fn new(repository: Arc<R>, config: &ProvisioningConfig) -> Self {
        Self {
            expander: ResourceExpander::new(Arc::clone(&repository)),
            repository,
            cache: RwLock::new(HashMap::new()),
            cache_enabled: config.resource_cache_enabled,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Get the complete (expanded, parsed) resource.
    ///
    /// Template and abstract resources are rejected: they cannot back a
    /// provisioning context.
    pub async fn get_complete_resource(
        &self,
        oid: &Oid,
        task: &Task,
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<Arc<CompleteResource>> {
        let result = parent_result.subresult(OP_GET_COMPLETE_RESOURCE);
        let outcome = self.get_complete_resource_internal(oid, task, result).await;
        result.record_outcome(&outcome);
        outcome
    }

    async fn get_complete_resource_internal(
        &self,
        oid: &Oid,
        task: &Task,
        result: &mut OperationResult,
    ) -> ProvisioningResult<Arc<CompleteResource>> {
        if self.cache_enabled {
            let cached = self.cache.read().await.get(oid).cloned();
            if let Some(entry) = cached {
                if self.is_current(&entry).await {
                    trace!("Resource cache hit for {}", oid);
                    return Ok(entry.resource);
                }
                debug!("Cached resource {} is outdated, reloading", oid);
            } else {
                trace!("Resource cache miss for {}", oid);
            }
        }

        let resource = self
            .repository
            .get_resource(oid, &GetOperationOptions::create_read_only())
            .await?;
        if !resource.is_concrete() {
            return Err(ConfigurationError::NotConcrete {
                resource: resource.label(),
            }
            .into());
        }

        let expanded = self.expander.expand(&resource, task, result).await?;
        let versions: Vec<(Oid, Option<u64>)> = std::iter::once((oid, &resource.version))
            .chain(expanded.ancestor_oids.iter().zip(&expanded.ancestor_versions))
            .map(|(oid, version)| (oid.clone(), parse_version(version)))
            .collect();

        let complete = Arc::new(CompleteResource::from_expanded(expanded)?);
        debug!(
            "Loaded resource {} (fingerprint {}) [task {}]",
            complete.label(),
            complete.fingerprint(),
            task.task_id
        );

        if self.cache_enabled {
            self.cache.write().await.insert(
                oid.clone(),
                CacheEntry {
                    resource: Arc::clone(&complete),
                    versions,
                },
            );
        }
        Ok(complete)
    }

    async fn is_current(&self, entry: &CacheEntry) -> bool {
        for (oid, version) in &entry.versions {
            let Some(version) = version else {
                return false;
            };
            match self.repository.get_version(oid).await {
                Ok(current) if current == *version => {}
                _ => return false,
            }
        }
        true
    }

    /// Drop the cached entry of a resource.
    pub async fn invalidate(&self, oid: &Oid) {
        self.cache.write().await.remove(oid);
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}

fn parse_version(version: &Option<String>) -> Option<u64> {
    version.as_deref().and_then(|v| v.parse().ok())
}
