use crate::reqres::HttpHeaders;

/// Common part of requests and responses: headers and a single-use content
pub trait HttpMessage {
    fn headers(&self) -> &HttpHeaders;

    /// Retrieves a header value, if any
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().get(name)
    }

    /// Contents of the `Content-Type` header
    fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Content type without its parameters, lowercased (`text/html; charset=utf-8` -> `text/html`)
    fn media_type(&self) -> Option<String> {
        let content_type = self.content_type()?;
        let media_type = content_type.split(';').next().unwrap_or_default().trim();
        if media_type.is_empty() {
            None
        } else {
            Some(media_type.to_ascii_lowercase())
        }
    }

    /// Contents of the `Content-Length` header, if it is a number
    fn content_length(&self) -> Option<u64> {
        self.header("Content-Length")?.trim().parse().ok()
    }
}
