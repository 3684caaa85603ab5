//! Schema trees: ordered key declarations and the resolution engine.
//!
//! A [`Schema`] is fixed at declaration time; resolving it against a
//! user-supplied partial mapping produces a [`Resolved`] instance with every
//! declared key populated (user value or default). Resolution is
//! all-or-nothing: any failure aborts the whole call, wrapped with the full
//! dotted path of the offending key.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::key::Key;
use crate::resolved::{ConfigValue, Resolved};

/// An ordered, immutable collection of key declarations.
///
/// Built through [`Schema::builder`]; cheap to clone (the declarations live
/// behind an `Arc`). The `name` is the type name used when rendering
/// resolved instances, e.g. `ServerConfig(host="localhost", port=8080)`.
#[derive(Debug, Clone)]
pub struct Schema {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    keys: Vec<Key>,
}

impl Schema {
    /// Start declaring a schema named `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            keys: Vec::new(),
        }
    }

    /// A builder seeded with this schema's name and keys. Re-registering an
    /// existing name replaces the base declaration in place, which is how a
    /// derived schema overrides (not merges) an inherited key.
    pub fn extend(&self) -> SchemaBuilder {
        SchemaBuilder {
            name: self.inner.name.clone(),
            keys: self.inner.keys.clone(),
        }
    }

    /// The schema's type name, used for rendering resolved instances.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// All declared keys, in declaration order.
    pub fn keys(&self) -> &[Key] {
        &self.inner.keys
    }

    /// Look up a declared key by name.
    pub fn key(&self, name: &str) -> Option<&Key> {
        self.inner.keys.iter().find(|k| k.name() == name)
    }

    /// Resolve a user-supplied partial mapping against this schema.
    ///
    /// Unknown top-level keys pass through into the resolved instance
    /// verbatim (the escape hatch); use [`resolve_strict`](Self::resolve_strict)
    /// to reject them instead. Fails with a type error if `user` is not a
    /// mapping.
    pub fn resolve(&self, user: Value) -> Result<Resolved, ResolveError> {
        self.resolve_value(user, false)
    }

    /// Like [`resolve`](Self::resolve), but fail on any key absent from the
    /// schema.
    pub fn resolve_strict(&self, user: Value) -> Result<Resolved, ResolveError> {
        self.resolve_value(user, true)
    }

    /// Resolve from any serializable mapping-shaped input (a `HashMap`, a
    /// struct, parsed YAML...). Unknown keys pass through as in
    /// [`resolve`](Self::resolve).
    pub fn resolve_from<S: Serialize>(&self, user: &S) -> Result<Resolved, ResolveError> {
        let value =
            serde_json::to_value(user).map_err(|e| ResolveError::Serialize(e.to_string()))?;
        self.resolve_value(value, false)
    }

    fn resolve_value(&self, user: Value, require_valid_keys: bool) -> Result<Resolved, ResolveError> {
        match user {
            Value::Object(map) => self.resolve_map(map, require_valid_keys, None),
            _ => Err(ResolveError::NotAMapping),
        }
    }

    /// The resolution engine. `previous` is the instance being updated, if
    /// any: declared keys whose current entry is a nested instance then
    /// merge user mappings into that instance's own retained input.
    pub(crate) fn resolve_map(
        &self,
        user: Map<String, Value>,
        require_valid_keys: bool,
        previous: Option<&Resolved>,
    ) -> Result<Resolved, ResolveError> {
        if require_valid_keys
            && let Some(unknown) = user.keys().find(|k| self.key(k).is_none())
        {
            return Err(ResolveError::UnexpectedKey(unknown.clone()));
        }

        let mut entries = Vec::with_capacity(self.inner.keys.len());
        for key in &self.inner.keys {
            let supplied = user.get(key.name()).cloned();
            let prev = previous.and_then(|p| p.nested(key.name()));
            let value = key
                .resolve(supplied, prev)
                .map_err(|e| e.in_key(key.name()))?;
            entries.push((key.name().to_string(), value));
        }

        // escape hatch: unknown keys pass through verbatim in lenient mode
        for (name, value) in &user {
            if self.key(name).is_none() {
                entries.push((name.clone(), ConfigValue::Value(value.clone())));
            }
        }

        Ok(Resolved::new(self.clone(), entries, user, require_valid_keys))
    }

    pub(crate) fn ptr_eq(&self, other: &Schema) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Builder for [`Schema`] declarations: an explicit, ordered registration
/// list.
pub struct SchemaBuilder {
    name: String,
    keys: Vec<Key>,
}

impl SchemaBuilder {
    /// Register a key. Registering a name that is already present replaces
    /// the earlier declaration in place (keeping its position); combined
    /// with [`Schema::extend`] this is the schema inheritance mechanism.
    pub fn key(mut self, key: Key) -> Self {
        match self.keys.iter_mut().find(|k| k.name() == key.name()) {
            Some(slot) => *slot = key,
            None => self.keys.push(key),
        }
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            inner: Arc::new(Inner {
                name: self.name,
                keys: self.keys,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fixtures::test::{bar_schema, sample_schema};
    use crate::validator::choice;
    use pretty_assertions::assert_eq;
    use serde::Serialize;
    use serde_json::json;

    #[test]
    fn empty_input_populates_every_default() {
        let config = sample_schema().resolve(json!({})).unwrap();
        assert_eq!(
            config.to_value(),
            json!({
                "foo": null,
                "bar": {"baz": 1, "quux": null},
                "grault": 2,
                "garply": 3,
            })
        );
    }

    #[test]
    fn user_values_override_defaults() {
        let config = sample_schema()
            .resolve(json!({"foo": 1, "bar": {"baz": 2}}))
            .unwrap();
        assert_eq!(
            config.to_value(),
            json!({
                "foo": 1,
                "bar": {"baz": 2, "quux": null},
                "grault": 2,
                "garply": 3,
            })
        );
    }

    #[test]
    fn nested_defaults_fill_around_user_values() {
        // schema {foo: default false, bar: subkeys[baz: default 1, qux: default "qux"]}
        let bar = Schema::builder("Bar")
            .key(Key::builder("baz").default(1).build().unwrap())
            .key(Key::builder("qux").default("qux").build().unwrap())
            .build();
        let schema = Schema::builder("Conf")
            .key(Key::builder("foo").default(false).build().unwrap())
            .key(Key::builder("bar").subkeys(bar).build().unwrap())
            .build();

        let config = schema.resolve(json!({"bar": {"baz": 2}})).unwrap();
        assert_eq!(
            config.to_value(),
            json!({"foo": false, "bar": {"baz": 2, "qux": "qux"}})
        );
    }

    #[test]
    fn non_mapping_input_is_a_type_error() {
        let err = sample_schema().resolve(json!(1)).unwrap_err();
        assert!(matches!(err, ResolveError::NotAMapping));
        assert_eq!(err.kind(), ErrorKind::Type);

        let err = sample_schema().resolve(json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn unknown_keys_pass_through_by_default() {
        let config = sample_schema()
            .resolve(json!({"mystery": [1, 2]}))
            .unwrap();
        assert_eq!(config.to_value()["mystery"], json!([1, 2]));
    }

    #[test]
    fn strict_mode_rejects_unknown_keys() {
        let err = sample_schema()
            .resolve_strict(json!({"foo": 1, "mystery": 2}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Unexpected key found in config: 'mystery'");
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn key_errors_are_wrapped_with_the_key_name() {
        let err = sample_schema()
            .resolve(json!({"garply": "x"}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "An error occurred while processing key 'garply': \
             User-specified value is not of the correct type"
        );
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn nested_errors_carry_the_full_dotted_path() {
        let c = Schema::builder("C")
            .key(
                Key::builder("c")
                    .validator(choice([json!(1), json!(2)]))
                    .build()
                    .unwrap(),
            )
            .build();
        let b = Schema::builder("B")
            .key(Key::builder("b").subkeys(c).build().unwrap())
            .build();
        let a = Schema::builder("A")
            .key(Key::builder("a").subkeys(b).build().unwrap())
            .build();

        let err = a.resolve(json!({"a": {"b": {"c": 3}}})).unwrap_err();
        assert_eq!(err.key_path(), Some("a.b.c"));
        assert_eq!(
            err.to_string(),
            "An error occurred while processing key 'a.b.c': \
             User-specified value failed validation: 3 is not one of {1, 2}"
        );
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn missing_required_key_names_the_key() {
        let schema = Schema::builder("Auth")
            .key(Key::builder("token").required().build().unwrap())
            .build();
        let err = schema.resolve(json!({})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "An error occurred while processing key 'token': Missing required key"
        );
        assert_eq!(err.kind(), ErrorKind::Value);

        let config = schema.resolve(json!({"token": "abc"})).unwrap();
        assert_eq!(config.to_value(), json!({"token": "abc"}));
    }

    #[test]
    fn resolve_from_serializable_input() {
        #[derive(Serialize)]
        struct Input {
            garply: u32,
        }

        let config = sample_schema().resolve_from(&Input { garply: 9 }).unwrap();
        assert_eq!(config.to_value()["garply"], json!(9));

        let err = sample_schema().resolve_from(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ResolveError::NotAMapping));
    }

    #[test]
    fn key_lookup_exposes_declarations() {
        let schema = sample_schema();
        let bar = schema.key("bar").unwrap();
        assert_eq!(bar.description(), Some("the bar"));
        assert!(bar.documents_subkeys());
        assert_eq!(bar.subkeys().unwrap().keys().len(), 2);
        assert!(schema.key("nope").is_none());
    }

    #[test]
    fn extend_overrides_in_place() {
        let base = sample_schema();
        let derived = base
            .extend()
            .key(Key::builder("garply").default(30).build().unwrap())
            .key(Key::builder("fred").default("f").build().unwrap())
            .build();

        // overridden key keeps its position; new key appends
        let names: Vec<&str> = derived.keys().iter().map(|k| k.name()).collect();
        assert_eq!(names, ["foo", "bar", "grault", "garply", "fred"]);

        let config = derived.resolve(json!({})).unwrap();
        assert_eq!(config.to_value()["garply"], json!(30));
        assert_eq!(config.to_value()["fred"], json!("f"));

        // the base schema is untouched
        let config = base.resolve(json!({})).unwrap();
        assert_eq!(config.to_value()["garply"], json!(3));
    }

    #[test]
    fn registering_a_duplicate_name_replaces_it() {
        let schema = Schema::builder("Conf")
            .key(Key::builder("x").default(1).build().unwrap())
            .key(Key::builder("x").default(2).build().unwrap())
            .build();
        assert_eq!(schema.keys().len(), 1);
        let config = schema.resolve(json!({})).unwrap();
        assert_eq!(config.to_value(), json!({"x": 2}));
    }

    #[test]
    fn enforce_subkeys_error_is_scoped_to_the_parent_key() {
        let schema = Schema::builder("Conf")
            .key(
                Key::builder("bar")
                    .subkeys(bar_schema())
                    .enforce_subkeys()
                    .build()
                    .unwrap(),
            )
            .build();
        let err = schema.resolve(json!({"bar": {"corge": 1}})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "An error occurred while processing key 'bar': \
             Unexpected key found in config: 'corge'"
        );
    }

    #[test]
    fn lenient_subkeys_pass_unknown_nested_keys_through() {
        let schema = Schema::builder("Conf")
            .key(Key::builder("bar").subkeys(bar_schema()).build().unwrap())
            .build();
        let config = schema.resolve(json!({"bar": {"corge": 1}})).unwrap();
        assert_eq!(
            config.to_value()["bar"],
            json!({"baz": 1, "quux": null, "corge": 1})
        );
    }
}
