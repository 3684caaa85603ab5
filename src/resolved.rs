//! Resolved configuration instances: the populated tree a schema produces,
//! plus in-place updates and the inverse "what did the user supply" view.

use std::fmt;
use std::ops::Index;

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::key::DefaultPolicy;
use crate::schema::Schema;
use crate::value::fmt_value;

/// One resolved slot: a plain value, or a nested resolved sub-configuration.
#[derive(Debug, Clone)]
pub enum ConfigValue {
    Value(Value),
    Nested(Resolved),
}

impl ConfigValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ConfigValue::Value(v) => Some(v),
            ConfigValue::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Resolved> {
        match self {
            ConfigValue::Nested(r) => Some(r),
            ConfigValue::Value(_) => None,
        }
    }

    /// The slot as a plain JSON value, flattening nested instances.
    pub fn to_value(&self) -> Value {
        match self {
            ConfigValue::Value(v) => v.clone(),
            ConfigValue::Nested(r) => r.to_value(),
        }
    }
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConfigValue::Value(a), ConfigValue::Value(b)) => a == b,
            (ConfigValue::Nested(a), ConfigValue::Nested(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Value(v) => f.write_str(&fmt_value(v)),
            ConfigValue::Nested(r) => write!(f, "{r}"),
        }
    }
}

/// A fully-populated configuration produced by [`Schema::resolve`].
///
/// Entries hold the declared keys in declaration order (each resolved to a
/// user value or its default), followed by any pass-through keys in the
/// order the user supplied them. The instance retains the exact user
/// mapping it was resolved from, which is what makes [`update`](Self::update)
/// compose and lets [`user_view`](Self::user_view) reconstruct the minimal
/// input.
#[derive(Debug, Clone)]
pub struct Resolved {
    schema: Schema,
    entries: Vec<(String, ConfigValue)>,
    user_input: Map<String, Value>,
    require_valid_keys: bool,
}

impl Resolved {
    pub(crate) fn new(
        schema: Schema,
        entries: Vec<(String, ConfigValue)>,
        user_input: Map<String, Value>,
        require_valid_keys: bool,
    ) -> Resolved {
        Resolved {
            schema,
            entries,
            user_input,
            require_valid_keys,
        }
    }

    /// The schema this instance was resolved against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Look up a resolved slot by name.
    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub(crate) fn nested(&self, name: &str) -> Option<&Resolved> {
        self.get(name).and_then(ConfigValue::as_nested)
    }

    /// The exact user mapping this instance was resolved from.
    pub fn user_input(&self) -> &Map<String, Value> {
        &self.user_input
    }

    /// The whole tree as a plain JSON mapping: declared keys in declaration
    /// order, then pass-through keys.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.entries {
            map.insert(name.clone(), value.to_value());
        }
        Value::Object(map)
    }

    /// Merge `new` over the originally supplied mapping (shallow at the top
    /// level) and re-resolve, replacing this instance in place.
    ///
    /// A key whose current entry is a nested instance recurses through that
    /// instance's own `update`, so a partial update like
    /// `{"bar": {"quux": 5}}` keeps `bar`'s other customizations — the deep
    /// merge happens one recursion level at a time. Strictness is the one
    /// this instance was originally resolved under.
    ///
    /// All-or-nothing: on error the instance is left untouched.
    pub fn update(&mut self, new: Value) -> Result<(), ResolveError> {
        match new {
            Value::Object(map) => self.update_map(map),
            _ => Err(ResolveError::NotAMapping),
        }
    }

    pub(crate) fn update_map(&mut self, new: Map<String, Value>) -> Result<(), ResolveError> {
        let mut merged = self.user_input.clone();
        for (k, v) in new {
            merged.insert(k, v);
        }
        let schema = self.schema.clone();
        let next = schema.resolve_map(merged, self.require_valid_keys, Some(&*self))?;
        *self = next;
        Ok(())
    }

    /// The minimal mapping a user would need to supply to reproduce this
    /// instance: `resolve(user_view(resolve(m)))` equals `resolve(m)`.
    ///
    /// A declared key is included iff its value differs from a fresh default
    /// resolution — except factory-defaulted keys, which are included iff
    /// the user actually supplied them (a factory may yield a fresh value on
    /// every call, so value comparison against "the" default is
    /// meaningless). Nested instances contribute their own view, inlined;
    /// an empty view is omitted only when the key defaults to its subkeys,
    /// since for any other default policy dropping the key would resolve to
    /// something else entirely. Pass-through keys are always included.
    pub fn user_view(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for (name, value) in &self.entries {
            let Some(key) = self.schema.key(name) else {
                // pass-through key
                out.insert(name.clone(), value.to_value());
                continue;
            };
            match value {
                ConfigValue::Nested(sub) => {
                    let view = sub.user_view();
                    // an absent key reproduces this instance only when the
                    // default is the subkeys themselves
                    let defaults_to_subkeys =
                        matches!(key.default_policy(), DefaultPolicy::Subkeys);
                    if !view.is_empty() || !defaults_to_subkeys {
                        out.insert(name.clone(), Value::Object(view));
                    }
                }
                ConfigValue::Value(v) => {
                    let differs = key.required()
                        || match key.default_policy() {
                            DefaultPolicy::Factory(_) => self.user_input.contains_key(name),
                            DefaultPolicy::Subkeys => true,
                            DefaultPolicy::Literal(d) => d != v,
                            DefaultPolicy::Empty => !v.is_null(),
                        };
                    if differs {
                        out.insert(name.clone(), v.clone());
                    }
                }
            }
        }
        out
    }
}

impl PartialEq for Resolved {
    /// Instances are equal iff they come from the same schema (by identity)
    /// and every entry is equal, recursively.
    fn eq(&self, other: &Self) -> bool {
        self.schema.ptr_eq(&other.schema) && self.entries == other.entries
    }
}

impl Index<&str> for Resolved {
    type Output = ConfigValue;

    fn index(&self, name: &str) -> &ConfigValue {
        self.get(name)
            .unwrap_or_else(|| panic!("no key '{name}' in {}", self.schema.name()))
    }
}

impl fmt::Display for Resolved {
    /// `TypeName(key1=val1, key2=val2, ...)` in entry order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.schema.name())?;
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}
