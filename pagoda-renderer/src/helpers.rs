//! Functions exposed to playbook templates.
//!
//! | Name      | Signature                                | Result                                      |
//! |-----------|------------------------------------------|---------------------------------------------|
//! | `notLast` | `notLast(index=<int>, collection=<any>)` | `true` unless `index` is the final position |
//!
//! Typical use, joining hosts without a trailing comma:
//!
//! ```text
//! {% for h in web.hosts.master %}{{ h.ip }}{% if notLast(index=loop.index0, collection=web.hosts.master) %},{% endif %}{% endfor %}
//! ```

use std::collections::HashMap;

use tera::{Tera, Value};

/// Name under which [`not_last`] is registered.
pub const NOT_LAST: &str = "notLast";

/// Register every helper on `tera`.
pub fn register(tera: &mut Tera) {
    tera.register_function(NOT_LAST, not_last);
}

/// `notLast(index, collection)`: whether `index < len(collection) - 1`.
///
/// Lists and mappings are measured by entry count, strings by characters.
pub fn not_last(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let index = match args.get("index") {
        Some(v) => v.as_i64().ok_or_else(|| {
            tera::Error::msg(format!("{NOT_LAST}: `index` must be an integer, got {v}"))
        })?,
        None => return Err(tera::Error::msg(format!("{NOT_LAST}: missing `index` argument"))),
    };
    let len = match args.get("collection") {
        Some(Value::Array(items)) => items.len(),
        Some(Value::Object(map)) => map.len(),
        Some(Value::String(s)) => s.chars().count(),
        Some(other) => {
            return Err(tera::Error::msg(format!(
                "{NOT_LAST}: `collection` has no length: {other}"
            )))
        }
        None => {
            return Err(tera::Error::msg(format!(
                "{NOT_LAST}: missing `collection` argument"
            )))
        }
    };
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    Ok(Value::Bool(index < len - 1))
}
