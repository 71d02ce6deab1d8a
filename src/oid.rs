//! Object identifier value object.
//!
//! Every persistent object (resources, shadows, owners) is addressed by an OID.
//! The wrapper enforces the only format rule that matters to this crate: an
//! OID is a non-blank string without surrounding whitespace.

use crate::error::{ProvisioningError, ProvisioningResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A validated object identifier.
///
/// ```rust
/// use shadow_provisioning::Oid;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let oid = Oid::new("10000000-0000-0000-0000-000000000004")?;
///     assert_eq!(oid.as_str(), "10000000-0000-0000-0000-000000000004");
///     assert!(Oid::new("  ").is_err());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid(String);

impl Oid {
    /// Create a new Oid with validation.
    pub fn new(value: impl Into<String>) -> ProvisioningResult<Self> {
        let value = value.into();
        Self::validate_format(&value)?;
        Ok(Self(value))
    }

    /// Generate a fresh random OID (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    fn validate_format(value: &str) -> ProvisioningResult<()> {
        if value.trim().is_empty() {
            return Err(ProvisioningError::invalid_argument("OID cannot be empty"));
        }
        if value.trim() != value {
            return Err(ProvisioningError::invalid_argument(format!(
                "OID '{value}' has leading or trailing whitespace"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Oid {
    type Err = ProvisioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Oid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Oid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
