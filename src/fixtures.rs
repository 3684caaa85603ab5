#[cfg(test)]
pub mod test {
    use serde_json::json;

    use crate::key::Key;
    use crate::schema::Schema;
    use crate::value::ValueType;

    /// The nested `bar` schema: `baz` defaults to 1, `quux` has no default.
    pub fn bar_schema() -> Schema {
        Schema::builder("BarValue")
            .key(
                Key::builder("baz")
                    .description("the baz")
                    .default(1)
                    .build()
                    .unwrap(),
            )
            .key(Key::builder("quux").description("the quux").build().unwrap())
            .build()
    }

    /// A sample schema exercising defaults, nesting, type constraints, and
    /// null handling.
    pub fn sample_schema() -> Schema {
        Schema::builder("SampleConfig")
            .key(Key::builder("foo").description("the foo").build().unwrap())
            .key(
                Key::builder("bar")
                    .description("the bar")
                    .subkeys(bar_schema())
                    .build()
                    .unwrap(),
            )
            .key(
                Key::builder("grault")
                    .default(2)
                    .types([ValueType::Int, ValueType::Float])
                    .allow_none()
                    .build()
                    .unwrap(),
            )
            .key(
                Key::builder("garply")
                    .default(3)
                    .types([ValueType::Int, ValueType::Float])
                    .build()
                    .unwrap(),
            )
            .build()
    }

    #[test]
    fn sample_schema_resolves_its_defaults() {
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
}
