//! Shadow naming, identifiers, attribute validation and conflict detection
//! through provisioning contexts.

use crate::assert_provisioning_error;
use crate::common::builders::ShadowBuilder;
use crate::common::fixtures::{fixture_repository, load_shadow};
use crate::common::{oid, oids, test_result, test_task};
use shadow_provisioning::schema::{ItemName, ShadowKind};
use shadow_provisioning::shadow::{
    AttributeValue, ResourceShadowCoordinates, ensure_shadow_name, is_conflicting,
};
use shadow_provisioning::{
    InMemoryResourceRepository, ProvisioningConfig, ProvisioningContext,
    ProvisioningContextFactory, ProvisioningError, SchemaError,
};

async fn context_for(
    config: ProvisioningConfig,
    resource_oid: &str,
    kind: ShadowKind,
    intent: &str,
) -> ProvisioningContext {
    let factory: ProvisioningContextFactory<InMemoryResourceRepository> =
        ProvisioningContextFactory::new(fixture_repository().await, config);
    factory
        .create_for_coordinates(
            &ResourceShadowCoordinates::for_kind_intent(oid(resource_oid), kind, intent),
            &test_task(),
            &mut test_result(),
        )
        .await
        .unwrap()
}

async fn single_type_context() -> ProvisioningContext {
    context_for(
        ProvisioningConfig::default(),
        oids::RESOURCE_DUMMY_SINGLE_TYPE,
        ShadowKind::Account,
        "employee",
    )
    .await
}

async fn multi_type_context() -> ProvisioningContext {
    context_for(
        ProvisioningConfig::default(),
        oids::RESOURCE_MULTI_TYPE,
        ShadowKind::Account,
        "default",
    )
    .await
}

#[tokio::test]
async fn test_name_from_single_primary_identifier() {
    let ctx = single_type_context().await;
    let shadow = load_shadow("account-jack");
    assert_eq!(
        ctx.determine_shadow_name(&shadow).unwrap().as_deref(),
        Some("8e3b2f61")
    );
}

#[tokio::test]
async fn test_name_from_naming_attribute_wins() {
    let ctx = multi_type_context().await;
    let shadow = ShadowBuilder::account(&oid(oids::RESOURCE_MULTI_TYPE))
        .uid("0001")
        .name("jack")
        .build();
    assert_eq!(
        ctx.determine_shadow_name(&shadow).unwrap().as_deref(),
        Some("jack")
    );

    let ambiguous = ShadowBuilder::account(&oid(oids::RESOURCE_MULTI_TYPE))
        .uid("0001")
        .name("jack")
        .name("jackie")
        .build();
    assert_provisioning_error!(
        ctx.determine_shadow_name(&ambiguous),
        ProvisioningError::Schema(SchemaError::AmbiguousName { count: 2, .. })
    );
}

#[tokio::test]
async fn test_configured_naming_fallback() {
    let config = ProvisioningConfig::builder()
        .with_naming_fallback_attribute(ItemName::ri("fullname"))
        .build()
        .unwrap();
    let ctx = context_for(
        config,
        oids::RESOURCE_DUMMY_SINGLE_TYPE,
        ShadowKind::Account,
        "employee",
    )
    .await;

    // no primary identifier in the shadow
    let shadow = ShadowBuilder::account(&oid(oids::RESOURCE_DUMMY_SINGLE_TYPE))
        .attribute(ItemName::ri("fullname"), "Jack Sparrow")
        .build();
    assert_eq!(
        ctx.determine_shadow_name(&shadow).unwrap().as_deref(),
        Some("Jack Sparrow")
    );

    let nameless = ShadowBuilder::account(&oid(oids::RESOURCE_DUMMY_SINGLE_TYPE))
        .name("jack")
        .build();
    assert_provisioning_error!(
        ctx.determine_shadow_name(&nameless),
        ProvisioningError::Schema(SchemaError::NoUsableName { .. })
    );
}

#[tokio::test]
async fn test_unusable_primary_identifier_is_not_replaced_by_name() {
    let ctx = single_type_context().await;
    let resource = oid(oids::RESOURCE_DUMMY_SINGLE_TYPE);

    let two_uids = ShadowBuilder::account(&resource)
        .uid("8e3b2f61")
        .uid("8e3b2f62")
        .name("jack")
        .build();
    assert_provisioning_error!(
        ctx.determine_shadow_name(&two_uids),
        ProvisioningError::Schema(SchemaError::NoUsableName { .. })
    );

    let numeric_uid = ShadowBuilder::account(&resource)
        .name("jack")
        .build()
        .with_attribute_value(ItemName::icfs_uid(), 42_i64);
    assert_provisioning_error!(
        ctx.determine_shadow_name(&numeric_uid),
        ProvisioningError::Schema(SchemaError::NoUsableName { .. })
    );
}

#[tokio::test]
async fn test_ensure_shadow_name_keeps_existing_name() {
    let ctx = single_type_context().await;
    let definition = ctx.definition().unwrap();

    let mut shadow = load_shadow("account-jack");
    let name = ensure_shadow_name(&mut shadow, definition, &ItemName::icfs_name()).unwrap();
    assert_eq!(name.as_deref(), Some("8e3b2f61"));

    shadow.name = Some("captain".to_string());
    let name = ensure_shadow_name(&mut shadow, definition, &ItemName::icfs_name()).unwrap();
    assert_eq!(name.as_deref(), Some("captain"));
}

#[tokio::test]
async fn test_primary_identifier_value() {
    let ctx = single_type_context().await;
    assert_eq!(
        ctx.determine_primary_identifier_value(&load_shadow("account-jack"))
            .unwrap()
            .as_deref(),
        Some("8e3b2f61")
    );

    let multi = ShadowBuilder::account(&oid(oids::RESOURCE_DUMMY_SINGLE_TYPE))
        .uid("a")
        .uid("b")
        .build();
    assert_provisioning_error!(
        ctx.determine_primary_identifier_value(&multi),
        ProvisioningError::Schema(SchemaError::UnusablePrimaryIdentifier { .. })
    );
}

#[tokio::test]
async fn test_fixture_shadow_is_valid() {
    let ctx = single_type_context().await;
    ctx.validate_shadow_attributes(&load_shadow("account-jack"))
        .unwrap();
}

#[tokio::test]
async fn test_attribute_validation_failures() {
    let ctx = single_type_context().await;
    let resource = oid(oids::RESOURCE_DUMMY_SINGLE_TYPE);

    let unknown = ShadowBuilder::account(&resource)
        .attribute(ItemName::ri("shoeSize"), "42")
        .build();
    assert_provisioning_error!(
        ctx.validate_shadow_attributes(&unknown),
        ProvisioningError::Schema(SchemaError::UnknownAttribute { .. })
    );

    let multiple = ShadowBuilder::account(&resource)
        .attribute(ItemName::ri("fullname"), "Jack")
        .attribute(ItemName::ri("fullname"), "John")
        .build();
    assert_provisioning_error!(
        ctx.validate_shadow_attributes(&multiple),
        ProvisioningError::Schema(SchemaError::MultipleValues { count: 2, .. })
    );

    let out_of_int_range = ShadowBuilder::account(&resource)
        .build()
        .with_attribute_value(ItemName::ri("loginCount"), 1_i64 << 40);
    assert_provisioning_error!(
        ctx.validate_shadow_attributes(&out_of_int_range),
        ProvisioningError::Schema(SchemaError::IncompatibleValueType { .. })
    );

    let wrong_type = ShadowBuilder::account(&resource)
        .attribute(ItemName::ri("loginCount"), "many")
        .build();
    assert_provisioning_error!(
        ctx.validate_shadow_attributes(&wrong_type),
        ProvisioningError::Schema(SchemaError::IncompatibleValueType { .. })
    );
}

#[tokio::test]
async fn test_mandatory_attribute_present_but_empty() {
    let ctx = multi_type_context().await;
    let resource = oid(oids::RESOURCE_MULTI_TYPE);

    // absent mandatory attributes are tolerated
    let absent = ShadowBuilder::account(&resource).uid("0001").build();
    ctx.validate_shadow_attributes(&absent).unwrap();

    let mut empty = absent.clone();
    if let Some(attributes) = empty.attributes.as_mut() {
        attributes.set_values(ItemName::ri("fullname"), Vec::<AttributeValue>::new());
    }
    assert_provisioning_error!(
        ctx.validate_shadow_attributes(&empty),
        ProvisioningError::Schema(SchemaError::MissingMandatoryAttribute { .. })
    );
}

#[tokio::test]
async fn test_wildcard_context_cannot_interpret_shadows() {
    let factory: ProvisioningContextFactory<InMemoryResourceRepository> =
        ProvisioningContextFactory::new(fixture_repository().await, ProvisioningConfig::default());
    let ctx = factory
        .create_for_coordinates(
            &ResourceShadowCoordinates::new(oid(oids::RESOURCE_MULTI_TYPE)),
            &test_task(),
            &mut test_result(),
        )
        .await
        .unwrap();
    assert_provisioning_error!(
        ctx.determine_shadow_name(&load_shadow("account-jack")),
        ProvisioningError::IllegalState { .. }
    );
}

#[test]
fn test_conflicts_between_fixture_shadows() {
    let jack = load_shadow("account-jack");
    let resource = oid(oids::RESOURCE_DUMMY_SINGLE_TYPE);

    let default_intent = ShadowBuilder::account(&resource).intent("default").build();
    assert!(is_conflicting(&jack, &default_intent));
    assert!(is_conflicting(&default_intent, &jack));

    let blank_intent = ShadowBuilder::account(&resource).intent("  ").build();
    assert!(is_conflicting(&jack, &blank_intent));

    let employee = load_shadow("account-dead");
    assert_eq!(employee.intent.as_deref(), Some("employee"));
    assert!(!is_conflicting(&jack, &employee));

    let mut kindless = default_intent.clone();
    kindless.kind = None;
    assert!(is_conflicting(&kindless, &jack));

    let other_resource = ShadowBuilder::account(&oid(oids::RESOURCE_MULTI_TYPE)).build();
    assert!(!is_conflicting(&jack, &other_resource));
}
