//! Whitelist filtering of params
//!
//! Only keys listed in [`Filters`] survive, and only when their filter returns `Some`
//! # Example
//! ```
//! # use dstack::params::{Params, filter::{self, Filters}};
//! # use serde_json::json;
//! let filters = Filters::new().add("age", filter::number);
//! let mut params = Params::new();
//! params.insert("age".into(), json!("30"));
//! params.insert("name".into(), json!("x"));
//! assert_eq!(filters.apply(&params), *json!({"age": 30}).as_object().unwrap());
//! ```

use std::fmt;

use serde_json::{Value, Number};

use crate::params::Params;

/// Turns a raw param value into an accepted one, or rejects it with `None`
pub type FilterFn = Box<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Key to filter mapping, see the [module docs](self)
#[derive(Default)]
pub struct Filters(Vec<(String, FilterFn)>);

impl Filters {
    pub fn new() -> Filters {
        Filters::default()
    }

    /// Allows `key`, converted by `filter`
    pub fn add(mut self, key: impl Into<String>, filter: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static) -> Filters {
        self.0.push((key.into(), Box::new(filter)));
        self
    }

    /// Keeps only the keys present in both `params` and these filters
    pub fn apply(&self, params: &Params) -> Params {
        let mut out = Params::new();
        for (key, filter) in &self.0 {
            if let Some(raw) = params.get(key)
                && let Some(value) = filter(raw)
            {
                out.insert(key.clone(), value);
            }
        }
        out
    }
}

impl fmt::Debug for Filters {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_list().entries(self.0.iter().map(|(key, _)| key)).finish()
    }
}

/// Numbers and numeric strings
pub fn number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(int) = s.parse::<i64>() {
                Some(Value::from(int))
            } else {
                s.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
            }
        }
        _ => None,
    }
}

/// Strings, numbers and booleans as a string
pub fn string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

/// Booleans and their usual form spellings (`on`, `1`, `yes`, `true` and the opposites)
pub fn boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "on" | "1" | "yes" => Some(Value::Bool(true)),
            "false" | "off" | "0" | "no" | "" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn whitelist() {
        let filters = Filters::new().add("age", number);
        let out = filters.apply(&params(json!({"age": "30", "name": "x"})));
        assert_eq!(out, params(json!({"age": 30})));
    }

    #[test]
    fn undefined_drops_key() {
        let filters = Filters::new()
            .add("age", number)
            .add("admin", |_: &Value| None)
            .add("missing", string);
        let out = filters.apply(&params(json!({"age": "old", "admin": "yes"})));
        assert!(out.is_empty());
    }

    #[test]
    fn conversions() {
        assert_eq!(number(&json!("2.5")), Some(json!(2.5)));
        assert_eq!(number(&json!(7)), Some(json!(7)));
        assert_eq!(string(&json!(true)), Some(json!("true")));
        assert_eq!(boolean(&json!("On")), Some(json!(true)));
        assert_eq!(boolean(&json!("maybe")), None);
        assert_eq!(string(&json!(["a"])), None);
    }
}
