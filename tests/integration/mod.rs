//! Integration Tests for Shadow Provisioning
//!
//! Tests are organized by the area they exercise. All of them run against the
//! in-memory repository, most of them against the JSON fixtures.
//!
//! ## Test Organization
//!
//! - `template_expansion` - `super` chains, merge rules, cycles, resource cache
//! - `context_factory` - context creation for coordinates, queries and shadows
//! - `shadow_utilities` - naming, identifiers, attribute validation, conflicts
//! - `lifecycle` - lifecycle classification with grace periods
//! - `property_tests` - proptest-based invariants
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test integration::context_factory
//! cargo test integration -- --nocapture
//! ```

pub mod context_factory;
pub mod property_tests;
pub mod shadow_utilities;
pub mod template_expansion;
