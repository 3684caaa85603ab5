//! Schema keys: one named configuration slot with a default policy, type
//! constraint, validator, and optional nested schema.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{ResolveError, SchemaError};
use crate::resolved::{ConfigValue, Resolved};
use crate::schema::Schema;
use crate::validator::Validator;
use crate::value::ValueType;

/// How a key obtains its value when the user does not supply one.
#[derive(Clone)]
pub(crate) enum DefaultPolicy {
    /// No default: the key resolves to null unless the user supplies a value.
    Empty,
    /// Default to the fully-defaulted nested schema.
    Subkeys,
    /// A fixed default value. Literals are cloned into each resolution, so
    /// they should be treated as immutable.
    Literal(Value),
    /// A zero-argument factory invoked freshly on each resolution. Lets
    /// mutable defaults (lists, mappings-via-subkeys) avoid aliasing across
    /// resolved instances.
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl fmt::Debug for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultPolicy::Empty => f.write_str("Empty"),
            DefaultPolicy::Subkeys => f.write_str("Subkeys"),
            DefaultPolicy::Literal(v) => write!(f, "Literal({v})"),
            DefaultPolicy::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// One named slot in a configuration schema.
///
/// A key declares how its value is defaulted, which user-supplied values are
/// acceptable (type constraint, null handling, validator), and optionally a
/// nested [`Schema`] when the value is itself a sub-configuration.
///
/// Keys are declared through [`Key::builder`]; the builder's
/// [`build`](KeyBuilder::build) checks the declaration invariants and fails
/// with a [`SchemaError`] on an inconsistent declaration.
#[derive(Debug, Clone)]
pub struct Key {
    name: String,
    description: Option<String>,
    default: DefaultPolicy,
    types: Option<Vec<ValueType>>,
    allow_none: bool,
    validator: Option<Validator>,
    subkeys: Option<Schema>,
    enforce_subkeys: bool,
    required: bool,
}

impl Key {
    /// Start declaring a key named `name`.
    pub fn builder(name: impl Into<String>) -> KeyBuilder {
        KeyBuilder {
            name: name.into(),
            description: None,
            literal: None,
            factory: None,
            subkeys_default: false,
            types: None,
            allow_none: false,
            validator: None,
            subkeys: None,
            enforce_subkeys: false,
            required: false,
        }
    }

    /// The key's name in the resolved configuration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Documentation text for this key, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The nested schema for this key's sub-configuration, if declared.
    pub fn subkeys(&self) -> Option<&Schema> {
        self.subkeys.as_ref()
    }

    /// True iff this key defaults to its fully-defaulted nested schema.
    /// Drives documentation rendering: such keys render as a nested block,
    /// everything else renders its [`documented_default`](Self::documented_default).
    pub fn documents_subkeys(&self) -> bool {
        matches!(self.default, DefaultPolicy::Subkeys)
    }

    /// Whether resolution fails unless the user supplies a value.
    pub fn required(&self) -> bool {
        self.required
    }

    pub(crate) fn default_policy(&self) -> &DefaultPolicy {
        &self.default
    }

    /// The default value this key documents as, for template rendering.
    /// `Empty`, `Subkeys` and required keys document as null (the nested
    /// shape is rendered by the exporter's recursion, not here).
    pub(crate) fn documented_default(&self) -> Value {
        match &self.default {
            DefaultPolicy::Literal(v) => v.clone(),
            DefaultPolicy::Factory(factory) => factory(),
            DefaultPolicy::Empty | DefaultPolicy::Subkeys => Value::Null,
        }
    }

    /// Resolve this key against the user-supplied value, `None` meaning the
    /// user did not mention the key at all (distinct from an explicit null).
    ///
    /// `previous` carries the current nested instance during an update, so
    /// a user-supplied mapping merges into the nested instance's own
    /// retained input instead of resolving the subschema from scratch.
    ///
    /// Errors do not yet carry the key name; the schema layer wraps them.
    pub(crate) fn resolve(
        &self,
        user: Option<Value>,
        previous: Option<&Resolved>,
    ) -> Result<ConfigValue, ResolveError> {
        let Some(value) = user else {
            if self.required {
                return Err(ResolveError::MissingRequired);
            }
            return match &self.default {
                DefaultPolicy::Factory(factory) => Ok(ConfigValue::Value(factory())),
                DefaultPolicy::Subkeys => {
                    // guaranteed by KeyBuilder::build
                    let sub = self.subkeys.as_ref().expect("subkeys default without subkeys");
                    Ok(ConfigValue::Nested(sub.resolve_map(Map::new(), false, None)?))
                }
                DefaultPolicy::Literal(v) => Ok(ConfigValue::Value(v.clone())),
                DefaultPolicy::Empty => Ok(ConfigValue::Value(Value::Null)),
            };
        };

        let none_ok = self.allow_none && value.is_null();
        if let Some(types) = &self.types
            && !none_ok
            && !types.iter().any(|t| t.matches(&value))
        {
            return Err(ResolveError::WrongType);
        }

        if let Some(validator) = &self.validator
            && let Some(message) = validator.validate(&value)
        {
            return Err(ResolveError::FailedValidation(message));
        }

        match (&self.subkeys, value) {
            (Some(sub), Value::Object(map)) => match previous {
                Some(prev) => {
                    let mut next = prev.clone();
                    next.update_map(map)?;
                    Ok(ConfigValue::Nested(next))
                }
                None => Ok(ConfigValue::Nested(sub.resolve_map(
                    map,
                    self.enforce_subkeys,
                    None,
                )?)),
            },
            (_, value) => Ok(ConfigValue::Value(value)),
        }
    }
}

/// Builder for [`Key`] declarations.
///
/// Setters chain; [`build`](Self::build) checks the invariants:
/// at most one default-bearing construct, no mapping literals, literal
/// defaults must satisfy the type constraint, `required` excludes defaults,
/// and the subkeys-dependent options need subkeys declared.
pub struct KeyBuilder {
    name: String,
    description: Option<String>,
    literal: Option<Value>,
    factory: Option<Arc<dyn Fn() -> Value + Send + Sync>>,
    subkeys_default: bool,
    types: Option<Vec<ValueType>>,
    allow_none: bool,
    validator: Option<Validator>,
    subkeys: Option<Schema>,
    enforce_subkeys: bool,
    required: bool,
}

impl KeyBuilder {
    /// Documentation text for this key.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// A fixed default value. Mappings are rejected at build time; nested
    /// defaults go through [`subkeys`](Self::subkeys).
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.literal = Some(value.into());
        self
    }

    /// A factory invoked freshly on each resolution, for mutable defaults
    /// that must not alias across resolved instances.
    ///
    /// The factory's value is used verbatim: a mapping-producing factory
    /// yields a plain value and never routes through a declared subkeys
    /// schema. Nested defaults go through
    /// [`default_to_subkeys`](Self::default_to_subkeys).
    pub fn default_fn<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Default to the fully-defaulted nested schema. Implied when
    /// [`subkeys`](Self::subkeys) is declared without any other default.
    pub fn default_to_subkeys(mut self) -> Self {
        self.subkeys_default = true;
        self
    }

    /// Restrict acceptable user-supplied values to the given types.
    pub fn types(mut self, types: impl IntoIterator<Item = ValueType>) -> Self {
        self.types = Some(types.into_iter().collect());
        self
    }

    /// Accept an explicit null even outside the type constraint.
    pub fn allow_none(mut self) -> Self {
        self.allow_none = true;
        self
    }

    /// Validate user-supplied values with `validator`.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Declare a nested schema for this key's sub-configuration.
    pub fn subkeys(mut self, schema: Schema) -> Self {
        self.subkeys = Some(schema);
        self
    }

    /// Reject user-supplied mappings containing keys absent from the
    /// subkeys schema.
    pub fn enforce_subkeys(mut self) -> Self {
        self.enforce_subkeys = true;
        self
    }

    /// Fail resolution unless the user explicitly supplies a value.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Check the declaration invariants and produce the [`Key`].
    pub fn build(self) -> Result<Key, SchemaError> {
        let declared = u8::from(self.literal.is_some())
            + u8::from(self.factory.is_some())
            + u8::from(self.subkeys_default);
        if declared > 1 {
            return Err(SchemaError::ConflictingDefaults { key: self.name });
        }
        if self.required && declared > 0 {
            return Err(SchemaError::RequiredWithDefault { key: self.name });
        }
        if self.subkeys_default && self.subkeys.is_none() {
            return Err(SchemaError::SubkeysDefaultWithoutSubkeys { key: self.name });
        }
        if self.enforce_subkeys && self.subkeys.is_none() {
            return Err(SchemaError::EnforceWithoutSubkeys { key: self.name });
        }
        if let Some(v) = &self.literal {
            if v.is_object() {
                return Err(SchemaError::MappingDefault { key: self.name });
            }
            let none_ok = self.allow_none && v.is_null();
            if let Some(types) = &self.types
                && !none_ok
                && !types.iter().any(|t| t.matches(v))
            {
                return Err(SchemaError::DefaultTypeMismatch { key: self.name });
            }
        }

        let default = if let Some(v) = self.literal {
            DefaultPolicy::Literal(v)
        } else if let Some(factory) = self.factory {
            DefaultPolicy::Factory(factory)
        } else if self.subkeys_default || (self.subkeys.is_some() && !self.required) {
            DefaultPolicy::Subkeys
        } else {
            DefaultPolicy::Empty
        };

        Ok(Key {
            name: self.name,
            description: self.description,
            default,
            types: self.types,
            allow_none: self.allow_none,
            validator: self.validator,
            subkeys: self.subkeys,
            enforce_subkeys: self.enforce_subkeys,
            required: self.required,
        })
    }
}
