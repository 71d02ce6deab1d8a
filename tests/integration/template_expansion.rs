//! Resource template expansion against the fixture repository.

use crate::common::fixtures::{fixture_repository, load_resource};
use crate::common::{init_logging, oid, oids, test_result, test_task};
use crate::{assert_connector_property, assert_provisioning_error};
use serde_json::json;
use shadow_provisioning::resource::{ContentFingerprint, merge_chain};
use shadow_provisioning::schema::{ItemName, ShadowKind};
use shadow_provisioning::{
    ConfigurationError, GetOperationOptions, InMemoryResourceRepository, OperationResultStatus,
    ProvisioningConfig, ProvisioningError, ResourceExpander, ResourceManager, ResourceRepository,
};
use std::sync::Arc;

async fn expand_fixture(
    repository: &Arc<InMemoryResourceRepository>,
    resource_oid: &str,
) -> Result<shadow_provisioning::ExpandedResource, ProvisioningError> {
    let resource = repository
        .get_resource(&oid(resource_oid), &GetOperationOptions::create_read_only())
        .await?;
    ResourceExpander::new(Arc::clone(repository))
        .expand(&resource, &test_task(), &mut test_result())
        .await
}

#[tokio::test]
async fn test_additional_connectors_template_expansion() {
    init_logging();
    let repository = fixture_repository().await;

    let expanded = expand_fixture(&repository, oids::RESOURCE_ADDITIONAL_CONNECTORS_1)
        .await
        .unwrap();
    let definition = &expanded.definition;

    // inherited from the template
    assert_connector_property!(definition, "instanceId", "main");
    assert_connector_property!(definition, "uselessString", "USELESS");
    // overridden by the resource
    assert_connector_property!(definition, "supportValidity", true);
    assert_eq!(definition.connector_ref.as_deref(), Some("connector-dummy"));

    assert_eq!(definition.oid, oid(oids::RESOURCE_ADDITIONAL_CONNECTORS_1));
    assert_eq!(definition.name, "Resource with Additional Connectors 1");
    assert!(!definition.template);
    assert_eq!(
        expanded.ancestor_oids,
        vec![oid(oids::TEMPLATE_ADDITIONAL_CONNECTORS)]
    );
}

#[tokio::test]
async fn test_additional_connectors_are_merged_by_name() {
    let repository = fixture_repository().await;
    let expanded = expand_fixture(&repository, oids::RESOURCE_ADDITIONAL_CONNECTORS_1)
        .await
        .unwrap();
    let definition = &expanded.definition;

    let names: Vec<&str> = definition
        .additional_connectors
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["csv", "ldap"]);

    let csv = definition.additional_connector("csv").unwrap();
    assert_eq!(csv.connector_ref.as_deref(), Some("connector-csv"));
    assert_eq!(csv.connector_configuration["encoding"], json!("latin1"));
    assert_eq!(
        csv.connector_configuration["filePath"],
        json!("/var/lib/provisioning/accounts.csv")
    );
    let ldap = definition.additional_connector("ldap").unwrap();
    assert_eq!(ldap.connector_configuration["host"], json!("ldap.example.com"));
}

#[tokio::test]
async fn test_schema_and_object_types_are_inherited() {
    let repository = fixture_repository().await;
    let expanded = expand_fixture(&repository, oids::RESOURCE_ADDITIONAL_CONNECTORS_1)
        .await
        .unwrap();
    let definition = &expanded.definition;

    let classes = &definition.schema.as_ref().unwrap().object_classes;
    assert_eq!(classes.len(), 2);

    let types = &definition.schema_handling.as_ref().unwrap().object_types;
    assert_eq!(types.len(), 2);
    let account = types
        .iter()
        .find(|t| t.kind == ShadowKind::Account)
        .unwrap();
    assert_eq!(account.default_for_kind, Some(true));
    assert_eq!(account.object_class, Some(ItemName::ri("AccountObjectClass")));

    let fullname = account
        .attributes
        .iter()
        .find(|r| r.reference.matches(&ItemName::ri("fullname")))
        .unwrap();
    assert_eq!(fullname.display_name.as_deref(), Some("Full name"));
    assert_eq!(fullname.mandatory, Some(true));
}

#[tokio::test]
async fn test_expansion_does_not_modify_stored_resource() {
    let repository = fixture_repository().await;
    let before = load_resource("resource-additional-connectors-1");

    expand_fixture(&repository, oids::RESOURCE_ADDITIONAL_CONNECTORS_1)
        .await
        .unwrap();

    let stored = repository
        .get_resource(
            &oid(oids::RESOURCE_ADDITIONAL_CONNECTORS_1),
            &GetOperationOptions::create_read_only(),
        )
        .await
        .unwrap();
    assert_eq!(stored.connector_configuration, before.connector_configuration);
    assert!(stored.schema.is_none());
}

#[tokio::test]
async fn test_cyclic_fixture_is_rejected() {
    let repository = fixture_repository().await;
    let mut result = test_result();
    let resource = repository
        .get_resource(&oid(oids::RESOURCE_CYCLE_A), &GetOperationOptions::create_read_only())
        .await
        .unwrap();

    let outcome = ResourceExpander::new(Arc::clone(&repository))
        .expand(&resource, &test_task(), &mut result)
        .await;

    assert_provisioning_error!(
        outcome,
        ProvisioningError::Configuration(ConfigurationError::InheritanceCycle { .. })
    );
    let expand_result = result.find("ResourceExpander.expand").unwrap();
    assert_eq!(expand_result.status, OperationResultStatus::FatalError);
    assert_eq!(expand_result.error_kind.as_deref(), Some("configuration"));
}

#[tokio::test]
async fn test_resource_manager_rejects_cycle_and_template() {
    let repository = fixture_repository().await;
    let manager = ResourceManager::new(Arc::clone(&repository), &ProvisioningConfig::default());

    let cyclic = manager
        .get_complete_resource(&oid(oids::RESOURCE_CYCLE_A), &test_task(), &mut test_result())
        .await;
    assert_provisioning_error!(
        cyclic,
        ProvisioningError::Configuration(ConfigurationError::InheritanceCycle { .. })
    );

    let template = manager
        .get_complete_resource(
            &oid(oids::TEMPLATE_ADDITIONAL_CONNECTORS),
            &test_task(),
            &mut test_result(),
        )
        .await;
    assert_provisioning_error!(
        template,
        ProvisioningError::Configuration(ConfigurationError::NotConcrete { .. })
    );
}

#[tokio::test]
async fn test_cached_resource_is_reexpanded_after_template_change() {
    let repository = fixture_repository().await;
    let manager = ResourceManager::new(Arc::clone(&repository), &ProvisioningConfig::default());
    let resource_oid = oid(oids::RESOURCE_ADDITIONAL_CONNECTORS_1);

    let first = manager
        .get_complete_resource(&resource_oid, &test_task(), &mut test_result())
        .await
        .unwrap();
    assert_connector_property!(first.definition(), "instanceId", "main");

    let template = load_resource("template-additional-connectors")
        .with_connector_property("instanceId", json!("secondary"));
    repository.add_resource(template).await;

    let second = manager
        .get_complete_resource(&resource_oid, &test_task(), &mut test_result())
        .await
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_connector_property!(second.definition(), "instanceId", "secondary");
    assert_ne!(first.fingerprint(), second.fingerprint());

    // unchanged repository: served from the cache
    let third = manager
        .get_complete_resource(&resource_oid, &test_task(), &mut test_result())
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&second, &third));
}

#[test]
fn test_fingerprint_is_stable_across_merges() {
    let template = load_resource("template-additional-connectors");
    let resource = load_resource("resource-additional-connectors-1");

    let first = merge_chain(&resource, std::slice::from_ref(&template));
    let mut second = merge_chain(&resource, std::slice::from_ref(&template));
    second.definition.version = Some("17".to_string());

    assert_eq!(
        ContentFingerprint::of_resource(&first.definition).unwrap(),
        ContentFingerprint::of_resource(&second.definition).unwrap()
    );
}
