//! Validation predicates for user-specified values.
//!
//! A [`Validator`] wraps a check function returning `None` when the value is
//! acceptable, or a human-readable rejection reason. Validators are pure and
//! run at most once per resolution for a given key; the resolution engine
//! surfaces the returned message as a value error naming the key.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::value::fmt_value;

/// A validation predicate for user-specified values.
///
/// ```
/// use figtree::Validator;
/// use serde_json::json;
///
/// let even = Validator::new(|v| match v.as_i64() {
///     Some(n) if n % 2 == 0 => None,
///     _ => Some("not an even integer".to_string()),
/// });
/// assert_eq!(even.validate(&json!(4)), None);
/// assert_eq!(even.validate(&json!(3)), Some("not an even integer".to_string()));
/// ```
#[derive(Clone)]
pub struct Validator {
    check: Arc<dyn Fn(&Value) -> Option<String> + Send + Sync>,
}

impl Validator {
    /// Wrap a check function. The `Option<String>` return type is the whole
    /// contract: `None` passes, `Some(reason)` rejects.
    pub fn new<F>(check: F) -> Validator
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        Validator {
            check: Arc::new(check),
        }
    }

    /// Run the check. `None` means the value passed.
    pub fn validate(&self, value: &Value) -> Option<String> {
        (self.check)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// A validator accepting only values from an ordered list of choices.
///
/// The rejection message lists the choices in declaration order; taking an
/// ordered sequence (rather than a set with unspecified iteration order)
/// keeps the rendered message deterministic.
///
/// ```
/// use figtree::validator::choice;
/// use serde_json::json;
///
/// let validator = choice([json!(1), json!(2)]);
/// assert_eq!(validator.validate(&json!(1)), None);
/// assert_eq!(
///     validator.validate(&json!(3)),
///     Some("3 is not one of {1, 2}".to_string()),
/// );
/// ```
pub fn choice<I>(allowed: I) -> Validator
where
    I: IntoIterator<Item = Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().collect();
    let rendered = allowed
        .iter()
        .map(fmt_value)
        .collect::<Vec<_>>()
        .join(", ");
    Validator::new(move |value| {
        if allowed.contains(value) {
            None
        } else {
            Some(format!("{} is not one of {{{rendered}}}", fmt_value(value)))
        }
    })
}
