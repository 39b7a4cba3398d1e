use std::fmt;

/// A single header, name is stored in its original case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

/// Header list with case-insensitive lookups
///
/// Names keep the case they were inserted with, order is not significant
#[derive(Default, Clone, PartialEq, Eq)]
pub struct HttpHeaders(Vec<HttpHeader>);

impl HttpHeaders {
    pub fn new() -> HttpHeaders {
        HttpHeaders::default()
    }

    /// Retrieves a header value, if any
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replaces every header with this name by a single one
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut HttpHeaders {
        let name = name.into();
        self.remove(&name);
        self.0.push(HttpHeader { name, value: value.into() });
        self
    }

    /// Pushes a new header, even if one with the same name exists
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut HttpHeaders {
        self.0.push(HttpHeader { name: name.into(), value: value.into() });
        self
    }

    /// Removes all headers with this name
    pub fn remove(&mut self, name: &str) {
        self.0.retain(|h| !h.name.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = &HttpHeader> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for HttpHeaders {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_map().entries(self.0.iter().map(|h| (&h.name, &h.value))).finish()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HttpHeaders {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> HttpHeaders {
        HttpHeaders(iter.into_iter().map(|(n, v)| HttpHeader { name: n.into(), value: v.into() }).collect())
    }
}

impl<N: Into<String>, V: Into<String>, const L: usize> From<[(N, V); L]> for HttpHeaders {
    fn from(headers: [(N, V); L]) -> HttpHeaders {
        headers.into_iter().collect()
    }
}

impl From<Vec<HttpHeader>> for HttpHeaders {
    fn from(headers: Vec<HttpHeader>) -> HttpHeaders {
        HttpHeaders(headers)
    }
}

impl<'a> IntoIterator for &'a HttpHeaders {
    type Item = &'a HttpHeader;
    type IntoIter = std::slice::Iter<'a, HttpHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::HttpHeaders;

    #[test]
    fn case_insensitive() {
        let mut headers = HttpHeaders::from([("Content-Type", "text/plain")]);
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));

        headers.set("content-type", "text/html");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.iter().next().unwrap().name, "content-type");
        assert_eq!(headers.get("Content-Type"), Some("text/html"));

        headers.remove("CONTENT-type");
        assert!(headers.is_empty());
    }
}
