//! Provisioning context creation against the fixture resources.

use crate::assert_provisioning_error;
use crate::common::builders::ShadowBuilder;
use crate::common::fixtures::{fixture_repository, load_shadow};
use crate::common::{init_logging, oid, oids, test_result, test_task};
use futures::future::join_all;
use shadow_provisioning::schema::{ItemName, ShadowKind};
use shadow_provisioning::shadow::{ResourceShadowCoordinates, ShadowFilter, ShadowQuery};
use shadow_provisioning::{
    InMemoryResourceRepository, OperationResultStatus, ProvisioningConfig,
    ProvisioningContextFactory, ProvisioningError, SchemaError,
};
use std::sync::Arc;

async fn factory() -> ProvisioningContextFactory<InMemoryResourceRepository> {
    ProvisioningContextFactory::new(fixture_repository().await, ProvisioningConfig::default())
}

#[tokio::test]
async fn test_shadow_without_intent_resolves_to_single_type() {
    init_logging();
    let factory = factory().await;
    let shadow = load_shadow("account-jack");
    assert_eq!(shadow.intent, None);

    let mut result = test_result();
    let ctx = factory
        .create_for_shadow(&shadow, &[], &test_task(), &mut result)
        .await
        .unwrap();

    let definition = ctx.definition().unwrap();
    assert!(definition.is_object_type_definition());
    assert_eq!(definition.kind(), Some(ShadowKind::Account));
    assert_eq!(definition.intent(), Some("employee"));
    assert_eq!(ctx.resource_oid(), &oid(oids::RESOURCE_DUMMY_SINGLE_TYPE));
    assert_eq!(ctx.task().task_id, "test-task");
    assert!(result.is_success());
}

#[tokio::test]
async fn test_implicit_default_can_be_disabled() {
    let config = ProvisioningConfig::builder()
        .with_implicit_default_intent(false)
        .build()
        .unwrap();
    let factory = ProvisioningContextFactory::new(fixture_repository().await, config);

    let mut result = test_result();
    let outcome = factory
        .create_for_shadow(&load_shadow("account-jack"), &[], &test_task(), &mut result)
        .await;
    assert_provisioning_error!(
        outcome,
        ProvisioningError::Schema(SchemaError::NoMatchingDefinition { .. })
    );
    let shadow_result = result
        .find("ProvisioningContextFactory.createForShadow")
        .unwrap();
    assert_eq!(shadow_result.status, OperationResultStatus::FatalError);
}

#[tokio::test]
async fn test_unclassified_shadow_gets_object_class_definition() {
    let factory = factory().await;
    let shadow = load_shadow("account-unclassified");

    let ctx = factory
        .create_for_shadow(&shadow, &[], &test_task(), &mut test_result())
        .await
        .unwrap();

    let definition = ctx.definition().unwrap();
    assert!(definition.is_object_class_definition());
    assert!(definition.has_auxiliary_object_class(&ItemName::ri("PosixAccount")));
    assert!(
        definition
            .find_attribute_definition(&ItemName::ri("uidNumber"))
            .is_some()
    );
    ctx.validate_shadow_attributes(&shadow).unwrap();
}

#[tokio::test]
async fn test_additional_auxiliary_classes_for_shadow() {
    let factory = factory().await;
    let shadow = load_shadow("account-jack");

    let ctx = factory
        .create_for_shadow(
            &shadow,
            &[ItemName::ri("PosixAccount")],
            &test_task(),
            &mut test_result(),
        )
        .await
        .unwrap();
    assert!(ctx.definition().unwrap().is_object_type_definition());
    assert!(
        ctx.definition()
            .unwrap()
            .has_auxiliary_object_class(&ItemName::ri("PosixAccount"))
    );

    let unknown = factory
        .create_for_shadow(
            &shadow,
            &[ItemName::ri("NoSuchClass")],
            &test_task(),
            &mut test_result(),
        )
        .await;
    assert_provisioning_error!(
        unknown,
        ProvisioningError::Schema(SchemaError::UnknownObjectClass { .. })
    );
}

#[tokio::test]
async fn test_kind_only_uses_inherited_default_type() {
    let factory = factory().await;
    let coordinates = ResourceShadowCoordinates::new(oid(oids::RESOURCE_MULTI_TYPE))
        .with_kind(ShadowKind::Account);

    let ctx = factory
        .create_for_coordinates(&coordinates, &test_task(), &mut test_result())
        .await
        .unwrap();

    let definition = ctx.definition().unwrap();
    assert_eq!(definition.intent(), Some("default"));
    assert_eq!(definition.object_class_name(), &ItemName::ri("AccountObjectClass"));
    // mandatory refinement inherited from the abstract base type
    assert!(
        definition
            .find_attribute_definition(&ItemName::ri("fullname"))
            .unwrap()
            .is_mandatory()
    );
}

#[tokio::test]
async fn test_abstract_type_is_not_resolvable() {
    let factory = factory().await;
    let coordinates = ResourceShadowCoordinates::for_kind_intent(
        oid(oids::RESOURCE_MULTI_TYPE),
        ShadowKind::Account,
        "base",
    );
    let outcome = factory
        .create_for_coordinates(&coordinates, &test_task(), &mut test_result())
        .await;
    assert_provisioning_error!(
        outcome,
        ProvisioningError::Schema(SchemaError::NoMatchingDefinition { .. })
    );
}

#[tokio::test]
async fn test_object_class_only_never_yields_type() {
    let factory = factory().await;
    let coordinates = ResourceShadowCoordinates::for_object_class(
        oid(oids::RESOURCE_MULTI_TYPE),
        ItemName::ri("AccountObjectClass"),
    );

    let ctx = factory
        .create_for_bulk_operation(&coordinates, &test_task(), &mut test_result())
        .await
        .unwrap();
    assert!(ctx.definition().unwrap().is_object_class_definition());
    assert_eq!(ctx.whole_class(), Some(true));
    assert_eq!(ctx.kind(), None);
}

#[tokio::test]
async fn test_bulk_query_extracts_coordinates() {
    let factory = factory().await;
    let query = ShadowQuery::and(vec![
        ShadowFilter::ResourceRef(oid(oids::RESOURCE_MULTI_TYPE)),
        ShadowFilter::Kind(ShadowKind::Entitlement),
        ShadowFilter::Intent("group".to_string()),
        ShadowFilter::Attribute {
            name: ItemName::icfs_name(),
            value: "admins".into(),
        },
    ]);

    let ctx = factory
        .create_for_bulk_query(&query, &test_task(), &mut test_result())
        .await
        .unwrap();
    assert_eq!(ctx.kind(), Some(ShadowKind::Entitlement));
    assert_eq!(ctx.object_class_name(), Some(&ItemName::ri("GroupObjectClass")));
    assert_eq!(ctx.whole_class(), Some(false));

    let mut result = test_result();
    let without_resource = factory
        .create_for_bulk_query(
            &ShadowQuery::new(ShadowFilter::Kind(ShadowKind::Account)),
            &test_task(),
            &mut result,
        )
        .await;
    assert_provisioning_error!(
        without_resource,
        ProvisioningError::Schema(SchemaError::MissingResourceInQuery)
    );
    assert!(result.is_error());
}

#[tokio::test]
async fn test_create_for_definition_reuses_cached_resource() {
    let factory = factory().await;
    let first = factory
        .create_for_coordinates(
            &ResourceShadowCoordinates::for_kind_intent(
                oid(oids::RESOURCE_MULTI_TYPE),
                ShadowKind::Account,
                "admin",
            ),
            &test_task(),
            &mut test_result(),
        )
        .await
        .unwrap();
    let definition = first.definition().unwrap().clone();
    assert!(definition.has_auxiliary_object_class(&ItemName::ri("PosixAccount")));

    let second = factory
        .create_for_definition(
            &oid(oids::RESOURCE_MULTI_TYPE),
            definition,
            &test_task(),
            &mut test_result(),
        )
        .await
        .unwrap();
    assert!(Arc::ptr_eq(first.resource(), second.resource()));
    assert_eq!(second.intent(), Some("admin"));
}

#[tokio::test]
async fn test_spawn_contexts() {
    let factory = factory().await;
    let ctx = factory
        .create_for_coordinates(
            &ResourceShadowCoordinates::new(oid(oids::RESOURCE_MULTI_TYPE)),
            &test_task(),
            &mut test_result(),
        )
        .await
        .unwrap();
    assert!(ctx.is_wildcard());

    let mut result = test_result();
    let group = factory
        .spawn_for_kind_intent(&ctx, ShadowKind::Entitlement, "group", &mut result)
        .unwrap();
    assert_eq!(group.object_class_name(), Some(&ItemName::ri("GroupObjectClass")));
    assert!(Arc::ptr_eq(group.resource(), ctx.resource()));
    assert_eq!(group.whole_class(), None);

    let posix = factory
        .spawn_for_object_class(
            &ctx,
            &ItemName::ri("AccountObjectClass"),
            &[ItemName::ri("PosixAccount")],
            &mut result,
        )
        .unwrap();
    assert!(posix.definition().unwrap().is_object_class_definition());
    assert!(
        posix
            .definition()
            .unwrap()
            .has_auxiliary_object_class(&ItemName::ri("PosixAccount"))
    );

    let own_shadow = ShadowBuilder::account(&oid(oids::RESOURCE_MULTI_TYPE))
        .intent("admin")
        .build();
    let admin = factory
        .spawn_for_shadow(&ctx, &own_shadow, &mut result)
        .unwrap();
    assert_eq!(admin.intent(), Some("admin"));
    assert!(result.is_success());

    let foreign_shadow = ShadowBuilder::account(&oid(oids::RESOURCE_DUMMY_SINGLE_TYPE)).build();
    assert_provisioning_error!(
        factory.spawn_for_shadow(&ctx, &foreign_shadow, &mut result),
        ProvisioningError::IllegalState { .. }
    );
    let failed_spawn = result.subresults.last().unwrap();
    assert_eq!(failed_spawn.operation, "ProvisioningContextFactory.spawnForShadow");
    assert_eq!(failed_spawn.status, OperationResultStatus::FatalError);
    assert_eq!(failed_spawn.error_kind.as_deref(), Some("illegal_state"));
    assert!(result.is_error());
}

#[tokio::test]
async fn test_spawn_from_whole_class_context_follows_definition() {
    let factory = factory().await;
    let whole_class = factory
        .create_for_bulk_operation(
            &ResourceShadowCoordinates::for_object_class(
                oid(oids::RESOURCE_MULTI_TYPE),
                ItemName::ri("AccountObjectClass"),
            ),
            &test_task(),
            &mut test_result(),
        )
        .await
        .unwrap();
    assert_eq!(whole_class.whole_class(), Some(true));

    let mut result = test_result();
    let typed = factory
        .spawn_for_kind_intent(&whole_class, ShadowKind::Account, "default", &mut result)
        .unwrap();
    assert_eq!(typed.kind(), Some(ShadowKind::Account));
    assert_eq!(typed.whole_class(), Some(false));

    let class_again = factory
        .spawn_for_object_class(&typed, &ItemName::ri("GroupObjectClass"), &[], &mut result)
        .unwrap();
    assert_eq!(class_again.kind(), None);
    assert_eq!(class_again.whole_class(), Some(true));
    assert!(
        result
            .find("ProvisioningContextFactory.spawnForKindIntent")
            .unwrap()
            .is_success()
    );
}

#[tokio::test]
async fn test_concurrent_context_creation_shares_resource() {
    let factory = factory().await;
    let shadows: Vec<_> = (0..16)
        .map(|i| {
            ShadowBuilder::account(&oid(oids::RESOURCE_DUMMY_SINGLE_TYPE))
                .uid(&format!("uid-{}", i))
                .build()
        })
        .collect();

    let contexts = join_all(shadows.iter().map(|shadow| {
        let factory = &factory;
        async move {
            let mut result = test_result();
            factory
                .create_for_shadow(shadow, &[], &test_task(), &mut result)
                .await
        }
    }))
    .await;

    let contexts: Vec<_> = contexts.into_iter().map(Result::unwrap).collect();
    assert!(
        contexts
            .iter()
            .all(|ctx| ctx.intent() == Some("employee"))
    );
    assert_eq!(factory.resource_manager().cached_count().await, 1);

    let first = contexts[0].resource();
    let shared = contexts
        .iter()
        .filter(|ctx| Arc::ptr_eq(ctx.resource(), first))
        .count();
    // concurrent first loads may race, later ones hit the cache
    assert!(shared >= 1);
}

#[tokio::test]
async fn test_partially_classified_shadow_is_rejected() {
    let factory = factory().await;
    let mut shadow = load_shadow("account-jack");
    shadow.kind = None;
    shadow.intent = Some("employee".to_string());

    let outcome = factory
        .create_for_shadow(&shadow, &[], &test_task(), &mut test_result())
        .await;
    assert_provisioning_error!(
        outcome,
        ProvisioningError::Schema(SchemaError::PartialClassification { .. })
    );

    let mut no_class = load_shadow("account-jack");
    no_class.object_class = None;
    let outcome = factory
        .create_for_shadow(&no_class, &[], &test_task(), &mut test_result())
        .await;
    assert_provisioning_error!(
        outcome,
        ProvisioningError::Schema(SchemaError::PartialClassification { .. })
    );
}
