//! Resource template expansion.
//!
//! A resource may extend another resource (usually a template) through
//! `super.resourceRef`, and that one may extend yet another. Expansion fetches
//! the whole chain and merges it from the furthest ancestor towards the
//! resource itself. The resource passed in is never modified.

use super::definition::ResourceDefinition;
use super::merge::merge_resource;
use crate::context::{OperationResult, Task};
use crate::error::{ConfigurationError, ProvisioningResult};
use crate::oid::Oid;
use crate::repository::{GetOperationOptions, ResourceRepository};
use log::{debug, trace};
use std::collections::HashSet;
use std::sync::Arc;

const OP_EXPAND: &str = "ResourceExpander.expand";

/// A resource with all of its ancestors merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedResource {
    pub definition: ResourceDefinition,
    /// Ancestors that contributed to the expansion, furthest first
    pub ancestor_oids: Vec<Oid>,
    /// Repository versions of the ancestors as fetched, in `ancestor_oids` order
    pub ancestor_versions: Vec<Option<String>>,
}

impl ExpandedResource {
    pub fn oid(&self) -> &Oid {
        &self.definition.oid
    }

    pub fn is_expanded(&self) -> bool {
        !self.ancestor_oids.is_empty()
    }
}

/// Expands resources against a repository.
pub struct ResourceExpander<R: ResourceRepository> {
    repository: Arc<R>,
}

impl<R: ResourceRepository> ResourceExpander<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Expand a resource by merging its `super` chain into a clone of it.
    pub async fn expand(
        &self,
        resource: &ResourceDefinition,
        task: &Task,
        parent_result: &mut OperationResult,
    ) -> ProvisioningResult<ExpandedResource> {
        let result = parent_result.subresult(OP_EXPAND);
        let outcome = self.expand_internal(resource, task).await;
        result.record_outcome(&outcome);
        outcome
    }

    async fn expand_internal(
        &self,
        resource: &ResourceDefinition,
        task: &Task,
    ) -> ProvisioningResult<ExpandedResource> {
        let chain = self.fetch_ancestors(resource, task).await?;
        if chain.is_empty() {
            trace!("Resource {} has no super resource", resource.label());
        } else {
            debug!(
                "Expanding resource {} over {} ancestor(s) [task {}]",
                resource.label(),
                chain.len(),
                task.task_id
            );
        }
        Ok(merge_chain(resource, &chain))
    }

    /// Fetch the ancestors of a resource, nearest first.
    async fn fetch_ancestors(
        &self,
        resource: &ResourceDefinition,
        task: &Task,
    ) -> ProvisioningResult<Vec<ResourceDefinition>> {
        let options = GetOperationOptions::create_read_only();
        let mut visited: Vec<Oid> = vec![resource.oid.clone()];
        let mut seen: HashSet<Oid> = HashSet::from([resource.oid.clone()]);
        let mut ancestors = Vec::new();
        let mut next = resource.super_oid().cloned();

        while let Some(oid) = next {
            if !seen.insert(oid.clone()) {
                return Err(ConfigurationError::InheritanceCycle {
                    oid: oid.to_string(),
                    chain: visited.iter().map(Oid::to_string).collect(),
                }
                .into());
            }
            trace!("Fetching super resource {} [task {}]", oid, task.task_id);
            let ancestor = self.repository.get_resource(&oid, &options).await?;
            visited.push(oid);
            next = ancestor.super_oid().cloned();
            ancestors.push(ancestor);
        }
        Ok(ancestors)
    }
}

/// Merge an already fetched ancestor chain (nearest first) into `resource`.
pub fn merge_chain(resource: &ResourceDefinition, ancestors: &[ResourceDefinition]) -> ExpandedResource {
    let mut iter = ancestors.iter().rev();
    let Some(root) = iter.next() else {
        return ExpandedResource {
            definition: resource.clone(),
            ancestor_oids: Vec::new(),
            ancestor_versions: Vec::new(),
        };
    };

    let mut merged = root.clone();
    for ancestor in iter {
        merged = merge_resource(ancestor, &merged);
    }
    ExpandedResource {
        definition: merge_resource(resource, &merged),
        ancestor_oids: ancestors.iter().rev().map(|a| a.oid.clone()).collect(),
        ancestor_versions: ancestors.iter().rev().map(|a| a.version.clone()).collect(),
    }
}
