//! # Resource Inspector
//!
//! A command-line utility that loads resource definition files, expands their
//! templates and prints the schema that provisioning would work with.
//!
//! ## Usage
//!
//! ### Inspect All Resources in a Directory
//!
//! ```bash
//! cargo run --bin resource-inspector ./resources/
//! ```
//!
//! ### Inspect One Resource
//!
//! ```bash
//! cargo run --bin resource-inspector ./resources/ 10000000-0000-0000-0000-000000000004
//! cargo run --bin resource-inspector resources/dummy.json
//! ```
//!
//! A single file can only be expanded if it does not extend a template, since
//! the template would not be loaded.
//!
//! ## Output Example
//!
//! ```text
//! Loaded 2 resources from ./resources/
//!
//! Resource: Dummy Resource (10000000-0000-0000-0000-000000000004)
//!   Ancestors: template-dummy
//!   Fingerprint: 2l1y8...=
//!   Connector configuration:
//!     instanceId = "main"
//!     supportValidity = true
//!   Object classes: 2
//!     - ri:AccountObjectClass (4 attributes)
//!     - ri:GroupObjectClass (2 attributes)
//!   Object types: 1
//!     - account/default -> ri:AccountObjectClass [default]
//!
//! Inspection Summary:
//!   Expanded resources: 1
//!   Templates skipped: 1
//!   Failed resources: 0
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: All concrete resources could be expanded
//! - `1`: Loading failed or one or more resources could not be expanded

use shadow_provisioning::{
    CompleteResource, GetOperationOptions, InMemoryResourceRepository, Oid, OperationResult,
    ProvisioningConfig, ResourceManager, ResourceRepository, Task,
};
use std::env;
use std::path::Path;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <resource-file-or-directory> [oid]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} ./resources/", args[0]);
        eprintln!("  {} resources/dummy.json", args[0]);
        process::exit(1);
    }

    let path = Path::new(&args[1]);
    let repository = Arc::new(InMemoryResourceRepository::new());

    let loaded = if path.is_file() {
        load_file(&repository, path).await.map(|oid| vec![oid])
    } else if path.is_dir() {
        repository.load_directory(path).await.map_err(|e| e.to_string())
    } else {
        eprintln!(
            "Error: '{}' is not a valid file or directory",
            path.display()
        );
        process::exit(1);
    };

    let oids = match loaded {
        Ok(oids) => oids,
        Err(e) => {
            eprintln!("❌ Failed to load resources: {}", e);
            process::exit(1);
        }
    };
    println!("Loaded {} resources from {}", oids.len(), path.display());

    let selected = match args.get(2) {
        Some(raw) => match raw.parse::<Oid>() {
            Ok(oid) => vec![oid],
            Err(e) => {
                eprintln!("❌ {}", e);
                process::exit(1);
            }
        },
        None => oids,
    };

    if inspect(repository, &selected).await > 0 {
        process::exit(1);
    }
}

async fn load_file(repository: &InMemoryResourceRepository, path: &Path) -> Result<Oid, String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    repository
        .add_resource_json(&content)
        .await
        .map_err(|e| e.to_string())
}

/// Expand and print the selected resources, returning the number of failures.
async fn inspect(repository: Arc<InMemoryResourceRepository>, oids: &[Oid]) -> usize {
    let manager = ResourceManager::new(Arc::clone(&repository), &ProvisioningConfig::default());
    let task = Task::with_generated_id().named("resource-inspector");
    let mut result = OperationResult::new("ResourceInspector.inspect");

    let mut expanded_count = 0;
    let mut skipped_count = 0;
    let mut error_count = 0;

    for oid in oids {
        let raw = match repository
            .get_resource(oid, &GetOperationOptions::create_read_only())
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("\n❌ {}: {}", oid, e);
                error_count += 1;
                continue;
            }
        };
        if !raw.is_concrete() {
            println!("\nSkipping template: {}", raw.label());
            skipped_count += 1;
            continue;
        }

        match manager.get_complete_resource(oid, &task, &mut result).await {
            Ok(resource) => {
                print_resource_summary(&resource);
                expanded_count += 1;
            }
            Err(e) => {
                eprintln!("\n❌ {}: {}", raw.label(), e);
                error_count += 1;
            }
        }
    }

    println!("\nInspection Summary:");
    println!("  Expanded resources: {}", expanded_count);
    println!("  Templates skipped: {}", skipped_count);
    println!("  Failed resources: {}", error_count);
    error_count
}

fn print_resource_summary(resource: &CompleteResource) {
    let definition = resource.definition();
    println!();
    println!("Resource: {}", resource.label());
    if !resource.ancestor_oids().is_empty() {
        let ancestors: Vec<&str> = resource.ancestor_oids().iter().map(Oid::as_str).collect();
        println!("  Ancestors: {}", ancestors.join(" -> "));
    }
    println!("  Fingerprint: {}", resource.fingerprint());

    if !definition.connector_configuration.is_empty() {
        println!("  Connector configuration:");
        for (name, value) in &definition.connector_configuration {
            println!("    {} = {}", name, value);
        }
    }
    for connector in &definition.additional_connectors {
        println!(
            "  Additional connector '{}': {} properties",
            connector.name,
            connector.connector_configuration.len()
        );
    }

    let schema = resource.schema();
    println!("  Object classes: {}", schema.object_classes().len());
    for class in schema.object_classes() {
        let auxiliary = if class.auxiliary { " [auxiliary]" } else { "" };
        println!(
            "    - {} ({} attributes){}",
            class.name,
            class.attributes.len(),
            auxiliary
        );
    }

    println!("  Object types: {}", schema.object_types().len());
    for object_type in schema.object_types() {
        let default = if object_type.is_default_for_kind() {
            " [default]"
        } else {
            ""
        };
        println!(
            "    - {} -> {}{}",
            object_type.identifier(),
            object_type.object_class(),
            default
        );
    }
}
