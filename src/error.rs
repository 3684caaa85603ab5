use thiserror::Error;

/// Whether an error is a type error (data of the wrong shape) or a value
/// error (well-shaped data that violates a declared rule).
///
/// Both declaration and resolution errors carry a kind, so callers can
/// branch on it programmatically instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Value,
}

/// Errors raised while declaring a schema key ([`KeyBuilder::build`]).
///
/// [`KeyBuilder::build`]: crate::KeyBuilder::build
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Key '{key}': only one default may be declared (literal, factory, or subkeys)")]
    ConflictingDefaults { key: String },

    #[error("Key '{key}': the default value cannot be a mapping; use subkeys instead")]
    MappingDefault { key: String },

    #[error("Key '{key}': the default value is not of the specified type(s)")]
    DefaultTypeMismatch { key: String },

    #[error("Key '{key}': cannot default to subkeys when no subkeys are declared")]
    SubkeysDefaultWithoutSubkeys { key: String },

    #[error("Key '{key}': enforce_subkeys requires subkeys to be declared")]
    EnforceWithoutSubkeys { key: String },

    #[error("Key '{key}': a required key cannot declare a default value")]
    RequiredWithDefault { key: String },
}

impl SchemaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SchemaError::ConflictingDefaults { .. }
            | SchemaError::MappingDefault { .. }
            | SchemaError::DefaultTypeMismatch { .. } => ErrorKind::Type,
            SchemaError::SubkeysDefaultWithoutSubkeys { .. }
            | SchemaError::EnforceWithoutSubkeys { .. }
            | SchemaError::RequiredWithDefault { .. } => ErrorKind::Value,
        }
    }
}

/// Errors raised while resolving user input against a schema.
///
/// Errors on a nested key surface as a single [`InKey`](Self::InKey) frame
/// whose path is the full dotted key path; the wrapped error keeps its
/// original [`kind`](Self::kind), so a type failure three levels deep is
/// still distinguishable from a validation failure.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("The user-specified configuration must be a mapping")]
    NotAMapping,

    #[error("Failed to serialize the user-specified configuration: {0}")]
    Serialize(String),

    #[error("User-specified value is not of the correct type")]
    WrongType,

    #[error("User-specified value failed validation: {0}")]
    FailedValidation(String),

    #[error("Unexpected key found in config: '{0}'")]
    UnexpectedKey(String),

    #[error("Missing required key")]
    MissingRequired,

    /// A failure on a (possibly nested) key, tagged with its dotted path.
    #[error("An error occurred while processing key '{path}': {source}")]
    InKey {
        path: String,
        #[source]
        source: Box<ResolveError>,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::NotAMapping | ResolveError::Serialize(_) | ResolveError::WrongType => {
                ErrorKind::Type
            }
            ResolveError::FailedValidation(_)
            | ResolveError::UnexpectedKey(_)
            | ResolveError::MissingRequired => ErrorKind::Value,
            ResolveError::InKey { source, .. } => source.kind(),
        }
    }

    /// The dotted path of the offending key, if the error is key-scoped.
    pub fn key_path(&self) -> Option<&str> {
        match self {
            ResolveError::InKey { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Scope this error to `key`. An already key-scoped error gets its path
    /// extended instead of re-wrapped, so the message always carries one
    /// full dotted path.
    pub(crate) fn in_key(self, key: &str) -> ResolveError {
        match self {
            ResolveError::InKey { path, source } => ResolveError::InKey {
                path: format!("{key}.{path}"),
                source,
            },
            other => ResolveError::InKey {
                path: key.to_string(),
                source: Box::new(other),
            },
        }
    }
}
