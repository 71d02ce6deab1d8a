//! Error types for provisioning core operations.
//!
//! The taxonomy mirrors the failure classes of resource resolution: malformed
//! configuration, schema mismatches, missing objects and internal invariant
//! violations. Schema failures carry their own detailed enum so that callers can
//! match on the exact rule that was violated.

/// Main error type for provisioning core operations.
#[derive(Debug, thiserror::Error)]
pub enum ProvisioningError {
    /// Malformed or cyclic resource configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Schema resolution or attribute validation failure
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Referenced object does not exist in the repository
    #[error("Object not found: {object_type} with OID {oid}")]
    ObjectNotFound { object_type: String, oid: String },

    /// Internal invariant violation; indicates a bug in the calling code
    #[error("Illegal state: {message}")]
    IllegalState { message: String },

    /// Caller supplied an argument the operation does not accept
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Repository backend failure
    #[error("Repository error: {message}")]
    Repository { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors found while expanding or parsing a resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// The `super` chain of a resource revisits a resource
    #[error("Resource inheritance cycle detected: {chain:?} revisits {oid}")]
    InheritanceCycle { oid: String, chain: Vec<String> },

    /// The object type inheritance inside one resource is cyclic
    #[error("Object type inheritance cycle in resource {resource}: {path:?}")]
    TypeInheritanceCycle { resource: String, path: Vec<String> },

    /// An object type refers to a super type that does not exist
    #[error("Super type {reference} of object type {object_type} not found")]
    MissingSuperType {
        object_type: String,
        reference: String,
    },

    /// The resource has no schema to resolve definitions against
    #[error("Resource {resource} has no schema")]
    MissingSchema { resource: String },

    /// An object type references an object class that is not in the schema
    #[error("Object type {object_type} refers to unknown object class {object_class}")]
    UnknownObjectClass {
        object_type: String,
        object_class: String,
    },

    /// An object type has no object class, even after inheritance
    #[error("Object type {object_type} has no object class")]
    MissingObjectClass { object_type: String },

    /// Two object types share the same kind and intent
    #[error("Duplicate object type definition for {kind}/{intent}")]
    DuplicateObjectType { kind: String, intent: String },

    /// More than one object type claims to be the default for a kind
    #[error("Multiple default object types for kind {kind}: {intents:?}")]
    MultipleDefaults { kind: String, intents: Vec<String> },

    /// A template or abstract resource was used where a concrete one is needed
    #[error("Resource {resource} is a template or abstract and cannot be used directly")]
    NotConcrete { resource: String },

    /// Invalid value in provisioning configuration
    #[error("Invalid configuration: {message}")]
    InvalidValue { message: String },
}

/// Schema errors for kind/intent/object class resolution and attribute checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// No object type or object class matches the requested coordinates
    #[error("No matching definition for {coordinates} in resource {resource}")]
    NoMatchingDefinition {
        resource: String,
        coordinates: String,
    },

    /// More than one definition matches and none can be preferred
    #[error("Ambiguous definition for {coordinates} in resource {resource}: {candidates:?}")]
    AmbiguousDefinition {
        resource: String,
        coordinates: String,
        candidates: Vec<String>,
    },

    /// Object class is not present in the resource schema
    #[error("Unknown object class {object_class} in resource {resource}")]
    UnknownObjectClass {
        resource: String,
        object_class: String,
    },

    /// Shadow carries an inconsistent classification
    #[error("Partially classified shadow: {details}")]
    PartialClassification { details: String },

    /// Attribute has no definition in the object class
    #[error("No definition for attribute {attribute} in {definition}")]
    UnknownAttribute {
        attribute: String,
        definition: String,
    },

    /// Mandatory attribute carries no value
    #[error("Mandatory attribute {attribute} has no value")]
    MissingMandatoryAttribute { attribute: String },

    /// Single-valued attribute carries more than one value
    #[error("Single-value attribute {attribute} has {count} values")]
    MultipleValues { attribute: String, count: usize },

    /// Attribute value does not match the declared type
    #[error("Wrong value in attribute {attribute}; expected {expected}, but was {actual}")]
    IncompatibleValueType {
        attribute: String,
        expected: String,
        actual: String,
    },

    /// Naming attribute holds more than one value
    #[error("Cannot determine name of shadow, naming attribute {attribute} has {count} values")]
    AmbiguousName { attribute: String, count: usize },

    /// Neither the naming attribute nor the identifiers can serve as a name
    #[error("No naming attribute defined (and identifier not usable) in {definition}")]
    NoUsableName { definition: String },

    /// Composite or multi-valued primary identifier where a single value is needed
    #[error("Cannot determine primary identifier value: {details}")]
    UnusablePrimaryIdentifier { details: String },

    /// Query does not specify the resource it targets
    #[error("Resource not defined in a search query")]
    MissingResourceInQuery,

    /// Query specifies one coordinate twice with different values
    #[error("Conflicting values for {coordinate} in query: {first} and {second}")]
    ConflictingQueryCoordinate {
        coordinate: String,
        first: String,
        second: String,
    },
}

// Convenience methods for creating common errors
impl ProvisioningError {
    /// Create an object-not-found error for a resource
    pub fn resource_not_found(oid: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            object_type: "resource".to_string(),
            oid: oid.into(),
        }
    }

    /// Create an illegal state error
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a repository error
    pub fn repository(message: impl Into<String>) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }

    /// Short machine-friendly label used in operation results
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Schema(_) => "schema",
            Self::ObjectNotFound { .. } => "object_not_found",
            Self::IllegalState { .. } => "illegal_state",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Repository { .. } => "repository",
            Self::Json(_) => "json",
        }
    }
}

impl SchemaError {
    /// Create a no-matching-definition error
    pub fn no_matching_definition(
        resource: impl Into<String>,
        coordinates: impl Into<String>,
    ) -> Self {
        Self::NoMatchingDefinition {
            resource: resource.into(),
            coordinates: coordinates.into(),
        }
    }

    /// Create a partial classification error
    pub fn partial_classification(details: impl Into<String>) -> Self {
        Self::PartialClassification {
            details: details.into(),
        }
    }
}

// Result type aliases for convenience
pub type ProvisioningResult<T> = Result<T, ProvisioningError>;
pub type SchemaResult<T> = Result<T, SchemaError>;
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
