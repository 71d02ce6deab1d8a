//! Provisioning contexts and what it takes to build them.
//!
//! [`ProvisioningContextFactory`] is the entry point: it loads the complete
//! resource through the [`ResourceManager`], resolves the object definition
//! and hands out immutable [`ProvisioningContext`]s. Every operation records
//! its outcome in the [`OperationResult`] passed by the caller.

pub mod factory;
pub mod operation_result;
pub mod provisioning_context;
pub mod resource_manager;
pub mod task;

pub use factory::{ProvisioningContextFactory, check_for_partial_classification};
pub use operation_result::{OperationResult, OperationResultStatus};
pub use provisioning_context::ProvisioningContext;
pub use resource_manager::{CompleteResource, ResourceManager};
pub use task::Task;
