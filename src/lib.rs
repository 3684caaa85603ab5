//! Declarative configuration schemas. Declare the shape once — keys,
//! defaults, types, validators, nested sub-configurations — and merge user
//! input against it.
//!
//! Figtree takes a schema (an ordered tree of [`Key`] declarations) and a
//! user-supplied partial mapping, and produces a fully-populated, validated
//! configuration tree. The same declaration also renders documented YAML and
//! JSON templates, so the docs can never drift from the code.
//!
//! ```
//! use figtree::{Key, Schema, ValueType};
//! use serde_json::json;
//!
//! let server = Schema::builder("Server")
//!     .key(Key::builder("host").description("Host to bind.").default("localhost").build()?)
//!     .key(Key::builder("port")
//!         .description("Port to listen on.")
//!         .default(8080)
//!         .types([ValueType::Int])
//!         .build()?)
//!     .build();
//!
//! let schema = Schema::builder("AppConfig")
//!     .key(Key::builder("debug").default(false).build()?)
//!     .key(Key::builder("server").description("Server settings.").subkeys(server).build()?)
//!     .build();
//!
//! let config = schema.resolve(json!({"server": {"port": 3000}}))?;
//! assert_eq!(config.to_value(), json!({
//!     "debug": false,
//!     "server": {"host": "localhost", "port": 3000},
//! }));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Design: one explicit declaration
//!
//! A [`Schema`] is an explicit, ordered registration of keys — no derive
//! macro, no field scanning, no separate schema file. Each [`Key`] declares:
//!
//! - **A default policy.** No default (the key resolves to null), a literal
//!   value, a factory invoked freshly per resolution (so mutable defaults
//!   never alias between instances), or "the fully-defaulted subkeys" for
//!   nested schemas.
//! - **Acceptance rules.** An optional type constraint ([`ValueType`]s over
//!   the JSON value model), whether an explicit null is acceptable, and an
//!   optional [`Validator`] returning a human-readable rejection reason.
//! - **Nesting.** A key may carry a sub-[`Schema`]; user-supplied mappings
//!   merge into it recursively, and `enforce_subkeys` rejects nested keys
//!   the sub-schema doesn't declare.
//!
//! Values follow the JSON object model (`serde_json::Value`), so anything
//! parsed from JSON, YAML, or TOML — or any `Serialize` type, via
//! [`Schema::resolve_from`] — can be resolved.
//!
//! # Resolution semantics
//!
//! [`Schema::resolve`] is all-or-nothing: every declared key resolves (user
//! value or default) or the whole call fails. User input is **sparse** —
//! only the keys being overridden need to appear; everything else falls
//! through to its default, recursively for nested schemas. Unknown top-level
//! keys pass through verbatim by default; [`Schema::resolve_strict`] rejects
//! them instead.
//!
//! Errors name the offending key by its full dotted path and preserve their
//! kind ([`ErrorKind::Type`] vs [`ErrorKind::Value`]) through every nesting
//! level:
//!
//! ```text
//! An error occurred while processing key 'server.port': User-specified value is not of the correct type
//! ```
//!
//! # Updates and the user view
//!
//! A [`Resolved`] instance remembers the exact mapping it was resolved from.
//! [`Resolved::update`] merges new input over that mapping (shallow at the
//! top level, recursing into nested instances one level at a time) and
//! re-resolves in place, so successive partial updates compose the way
//! layered config sources do. [`Resolved::user_view`] is the inverse of
//! resolution: the minimal mapping that reproduces the instance, with
//! defaulted keys omitted.
//!
//! # Templates
//!
//! [`export::yaml_template`] renders the defaulted tree with each key's
//! description as comment lines above it; [`export::json_template`] renders
//! the plain defaulted tree. Both derive from the declarations alone.
//!
//! # Scope
//!
//! Figtree performs no I/O and sources nothing from the environment: input
//! is always an in-memory mapping, and resolution is pure, synchronous
//! computation. File formats, CLI flags, and documentation tooling sit on
//! top, consuming the schema through [`Schema::key`], [`Key::description`],
//! and [`Key::documents_subkeys`].

pub mod error;
pub mod export;
pub mod validator;

mod key;
mod resolved;
mod schema;
mod value;

#[cfg(test)]
mod fixtures;

pub use error::{ErrorKind, ResolveError, SchemaError};
pub use key::{Key, KeyBuilder};
pub use resolved::{ConfigValue, Resolved};
pub use schema::{Schema, SchemaBuilder};
pub use validator::Validator;
pub use value::ValueType;
