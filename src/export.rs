//! Render a schema's defaulted shape into documented templates.
//!
//! Walks the declarations only — no resolved instance is needed. Each key's
//! description becomes comment lines above the key in the YAML rendering;
//! keys defaulting to their subkeys render as nested blocks (per
//! [`Key::documents_subkeys`]), everything else renders its default value.
//! Pure string building, no I/O.
//!
//! [`Key::documents_subkeys`]: crate::Key::documents_subkeys

use serde_json::Value;

use crate::schema::Schema;

const INDENT: &str = "  ";

/// Render the fully-defaulted schema as YAML, with each key's description
/// emitted as `#` comment lines above it. Keys without a default (and
/// required keys) render as `null`.
pub fn yaml_template(schema: &Schema) -> String {
    let mut lines = Vec::new();
    render_keys(schema, 0, &mut lines);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_keys(schema: &Schema, depth: usize, lines: &mut Vec<String>) {
    let pad = INDENT.repeat(depth);
    for (i, key) in schema.keys().iter().enumerate() {
        if depth == 0 && i > 0 {
            lines.push(String::new());
        }
        if let Some(description) = key.description() {
            for line in description.lines() {
                lines.push(format!("{pad}# {line}"));
            }
        }
        match key.subkeys().filter(|_| key.documents_subkeys()) {
            Some(sub) => {
                lines.push(format!("{pad}{}:", key.name()));
                render_keys(sub, depth + 1, lines);
            }
            None => {
                let value = yaml_scalar(&key.documented_default());
                lines.push(format!("{pad}{}: {value}", key.name()));
            }
        }
    }
}

/// Render one value on a single line: scalars via YAML, containers in JSON
/// flow style (which is valid YAML).
fn yaml_scalar(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        _ => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| value.to_string()),
    }
}

/// The fully-defaulted schema as pretty-printed JSON. JSON carries no
/// comments, so descriptions are omitted.
pub fn json_template(schema: &Schema) -> String {
    let tree = default_tree(schema);
    let mut out = serde_json::to_string_pretty(&tree).unwrap_or_else(|_| "{}".to_string());
    out.push('\n');
    out
}

fn default_tree(schema: &Schema) -> Value {
    let mut map = serde_json::Map::new();
    for key in schema.keys() {
        let value = match key.subkeys().filter(|_| key.documents_subkeys()) {
            Some(sub) => default_tree(sub),
            None => key.documented_default(),
        };
        map.insert(key.name().to_string(), value);
    }
    Value::Object(map)
}
