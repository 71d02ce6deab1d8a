//! Content fingerprints of expanded resources.
//!
//! A fingerprint is the base64-encoded SHA-256 hash of the canonical JSON form
//! of a resource. Two expansions with equal content have equal fingerprints,
//! which lets callers tell whether a re-expanded resource actually changed.
//! The repository `version` field is excluded from the hash.

use super::definition::ResourceDefinition;
use crate::error::ProvisioningResult;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// Fingerprint of raw bytes.
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();
        Self(BASE64.encode(hash))
    }

    /// Fingerprint of a resource definition.
    pub fn of_resource(resource: &ResourceDefinition) -> ProvisioningResult<Self> {
        let mut canonical = resource.clone();
        canonical.version = None;
        // struct fields serialize in declaration order and maps are BTreeMaps
        let bytes = serde_json::to_vec(&canonical)?;
        Ok(Self::from_content(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
