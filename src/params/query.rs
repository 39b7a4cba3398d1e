//! URL query string decoding

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::params::Params;

/// Percent-decodes a component, optionally treating `+` as a space
pub(crate) fn decode_component(s: &str, plus_is_space: bool) -> String {
    if plus_is_space && s.contains('+') {
        percent_decode_str(&s.replace('+', " ")).decode_utf8_lossy().into_owned()
    } else {
        percent_decode_str(s).decode_utf8_lossy().into_owned()
    }
}

/// Adds a value, a repeated key turns into an array of all its values
pub(crate) fn insert(params: &mut Params, key: String, value: Value) {
    match params.get_mut(&key) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            params.insert(key, value);
        }
    }
}

/// Parses `a=1&b=2;c` into a mapping
///
/// A key without `=` gets an empty string
pub fn parse(query: &str) -> Params {
    let mut params = Params::new();
    for pair in query.split(['&', ';']) {
        if pair.is_empty() { continue; }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key, true);
        if key.is_empty() { continue; }
        insert(&mut params, key, Value::String(decode_component(value, true)));
    }
    params
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse;

    #[test]
    fn decodes() {
        let params = parse("name=J%C3%BCrgen+M&empty=&flag&=skipped");
        assert_eq!(params["name"], "Jürgen M");
        assert_eq!(params["empty"], "");
        assert_eq!(params["flag"], "");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn repeated_keys() {
        let params = parse("id=1&id=2;id=3");
        assert_eq!(params["id"], json!(["1", "2", "3"]));
    }

    #[test]
    fn empty() {
        assert!(parse("").is_empty());
        assert!(parse("&&").is_empty());
    }
}
