//! Property-Based Testing for Expansion, Resolution and Shadow Utilities
//!
//! Uses proptest to generate template chains, schemas and shadows and checks
//! the invariants that must hold for all of them.

use crate::common::builders::{ChainBuilder, account_class, account_type};
use proptest::prelude::*;
use serde_json::json;
use shadow_provisioning::schema::{ItemName, ObjectClassDefinition, ResourceSchema, ShadowKind};
use shadow_provisioning::shadow::{Shadow, determine_shadow_name, intent_equals, is_conflicting};
use shadow_provisioning::{
    ConfigurationError, DefinitionResolver, InMemoryResourceRepository, Oid, OperationResult,
    ProvisioningError, ResolutionRequest, ResourceExpander, SchemaError, Task,
};
use std::sync::Arc;

const PROPERTY: &str = "instanceId";

/// Per-level optional values of one connector property, level 0 first
fn chain_strategy() -> impl Strategy<Value = Vec<Option<u8>>> {
    prop::collection::vec(prop::option::of(any::<u8>()), 2..7)
}

fn chain_with_values(values: &[Option<u8>]) -> ChainBuilder {
    values
        .iter()
        .enumerate()
        .fold(ChainBuilder::new(values.len() - 1), |builder, (level, value)| match value {
            Some(value) => builder.with_property(level, PROPERTY, json!(value)),
            None => builder,
        })
}

async fn expand_in_repository(
    resource: &shadow_provisioning::ResourceDefinition,
    ancestors: &[shadow_provisioning::ResourceDefinition],
) -> Result<shadow_provisioning::ExpandedResource, ProvisioningError> {
    let repository = Arc::new(InMemoryResourceRepository::new());
    repository.add_resource(resource.clone()).await;
    for ancestor in ancestors {
        repository.add_resource(ancestor.clone()).await;
    }
    ResourceExpander::new(repository)
        .expand(resource, &Task::default(), &mut OperationResult::new("property"))
        .await
}

fn intent_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just(String::new()),
        Just("  ".to_string()),
        Just("default".to_string()),
        Just("employee".to_string()),
        Just("admin".to_string()),
    ])
}

fn shadow_strategy() -> impl Strategy<Value = Shadow> {
    (
        prop::option::of(prop_oneof![Just("r1"), Just("r2")]),
        prop::option::of(prop_oneof![
            Just(ShadowKind::Account),
            Just(ShadowKind::Entitlement),
            Just(ShadowKind::Generic),
        ]),
        intent_strategy(),
    )
        .prop_map(|(resource, kind, intent)| {
            let mut shadow = Shadow::new();
            shadow.resource_ref = resource.map(|r| Oid::new(r).expect("valid oid"));
            shadow.kind = kind;
            shadow.intent = intent;
            shadow
        })
}

fn naming_schema() -> ResourceSchema {
    ResourceSchema::new(
        "property",
        vec![account_class().with_naming_attribute(ItemName::icfs_name())],
        vec![account_type("default").as_default()],
    )
    .expect("valid schema")
}

proptest! {
    #[test]
    fn test_connector_property_comes_from_nearest_definer(values in chain_strategy()) {
        tokio_test::block_on(async {
            let (resource, ancestors) = chain_with_values(&values).build();
            let expanded = expand_in_repository(&resource, &ancestors).await.unwrap();

            let expected = values.iter().flatten().next().map(|value| json!(value));
            assert_eq!(expanded.definition.connector_configuration.get(PROPERTY), expected.as_ref());

            // furthest ancestor first, never the resource itself
            let expected_ancestors: Vec<Oid> =
                ancestors.iter().rev().map(|a| a.oid.clone()).collect();
            assert_eq!(expanded.ancestor_oids, expected_ancestors);
            assert!(!expanded.ancestor_oids.contains(&resource.oid));
        });
    }

    #[test]
    fn test_cyclic_chain_is_always_detected(depth in 1usize..6, back_to in 0usize..6) {
        tokio_test::block_on(async {
            let back_to = back_to % (depth + 1);
            let (resource, mut ancestors) = ChainBuilder::new(depth).build();
            let last = ancestors.len() - 1;
            ancestors[last] = ancestors[last].clone().extending(ChainBuilder::oid(back_to));

            let outcome = expand_in_repository(&resource, &ancestors).await;
            assert!(matches!(
                outcome,
                Err(ProvisioningError::Configuration(ConfigurationError::InheritanceCycle { .. }))
            ));
        });
    }

    #[test]
    fn test_single_naming_value_is_the_name(
        name in "[a-z][a-z0-9]{0,11}",
        uids in prop::collection::vec("[0-9a-f]{8}", 0..3)
    ) {
        let schema = naming_schema();
        let definition = schema
            .object_type_definition(ShadowKind::Account, "default")
            .unwrap();

        let mut shadow = Shadow::new().with_attribute_value(ItemName::icfs_name(), name.as_str());
        for uid in &uids {
            shadow = shadow.with_attribute_value(ItemName::icfs_uid(), uid.as_str());
        }
        prop_assert_eq!(determine_shadow_name(&shadow, &definition).unwrap(), Some(name.clone()));

        let ambiguous = shadow.with_attribute_value(ItemName::icfs_name(), format!("{}-2", name));
        prop_assert!(matches!(
            determine_shadow_name(&ambiguous, &definition),
            Err(SchemaError::AmbiguousName { .. })
        ), "expected SchemaError::AmbiguousName");
    }

    #[test]
    fn test_single_primary_identifier_is_the_name(uid in "[0-9a-f]{1,16}") {
        let schema = ResourceSchema::new(
            "property",
            vec![ObjectClassDefinition::new(ItemName::ri("AccountObjectClass"))
                .with_attribute(
                    shadow_provisioning::schema::ResourceAttributeDefinition::new(
                        ItemName::icfs_uid(),
                        shadow_provisioning::schema::AttributeType::String,
                    )
                    .as_primary_identifier(),
                )],
            vec![],
        )
        .expect("valid schema");
        let definition = schema
            .object_class_definition(&ItemName::ri("AccountObjectClass"))
            .unwrap();

        let shadow = Shadow::new().with_attribute_value(ItemName::icfs_uid(), uid.as_str());
        prop_assert_eq!(determine_shadow_name(&shadow, &definition).unwrap(), Some(uid));
    }

    #[test]
    fn test_is_conflicting_is_symmetric(a in shadow_strategy(), b in shadow_strategy()) {
        prop_assert_eq!(is_conflicting(&a, &b), is_conflicting(&b, &a));
        prop_assert!(is_conflicting(&a, &a));
    }

    #[test]
    fn test_intent_equals_is_an_equivalence(
        a in intent_strategy(),
        b in intent_strategy(),
        c in intent_strategy()
    ) {
        let (a, b, c) = (a.as_deref(), b.as_deref(), c.as_deref());
        prop_assert!(intent_equals(a, a));
        prop_assert_eq!(intent_equals(a, b), intent_equals(b, a));
        if intent_equals(a, b) && intent_equals(b, c) {
            prop_assert!(intent_equals(a, c));
        }
    }

    #[test]
    fn test_object_class_only_resolves_to_class(
        intents in prop::collection::btree_set("[a-z]{1,8}", 0..5),
        with_default in any::<bool>()
    ) {
        let types = intents
            .iter()
            .enumerate()
            .map(|(i, intent)| {
                let object_type = account_type(intent);
                if with_default && i == 0 { object_type.as_default() } else { object_type }
            })
            .collect();
        let schema = ResourceSchema::new("property", vec![account_class()], types)
            .expect("valid schema");

        let definition = DefinitionResolver::default()
            .resolve(
                &schema,
                &ResolutionRequest::for_object_class(ItemName::ri("AccountObjectClass")),
            )
            .unwrap();
        prop_assert!(definition.is_object_class_definition());
        prop_assert_eq!(definition.kind(), None);
    }
}
