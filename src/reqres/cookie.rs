//! `Cookie` header parsing
//!
//! Browsers send cookies with more specific paths first (RFC 2109), so when a name
//! repeats, the first occurrence is the one that applies to this request

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::params::query::decode_component;

/// Parses a `Cookie` header value
pub(crate) fn parse(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for pair in header.split([';', ',']) {
        let Some((name, value)) = pair.split_once('=') else { continue };
        let name = name.trim();
        if name.is_empty() { continue; }

        let mut value = value.trim();
        if let Some(unquoted) = value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            value = unquoted;
        }

        if let Entry::Vacant(entry) = cookies.entry(name.to_string()) {
            entry.insert(decode_component(value, false));
        }
    }
    cookies
}

#[cfg(test)]
mod tests {
    use super::parse;

    #[test]
    fn first_wins() {
        let cookies = parse("a=1; a=2");
        assert_eq!(cookies["a"], "1");
    }

    #[test]
    fn quotes_and_encoding() {
        let cookies = parse(r#"session="abc def"; theme=dark%20blue, lang = en ; broken"#);
        assert_eq!(cookies["session"], "abc def");
        assert_eq!(cookies["theme"], "dark blue");
        assert_eq!(cookies["lang"], "en");
        assert_eq!(cookies.len(), 3);
    }

    #[test]
    fn keeps_plus() {
        assert_eq!(parse("q=a+b")["q"], "a+b");
    }
}
