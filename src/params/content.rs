//! Request content parsing

use std::io;

use tokio::io::AsyncReadExt;
use serde_json::Value;

use crate::params::{Params, ContentError, query, multipart};
use crate::reqres::{HttpRequest, HttpContent, HttpMessage};

/// Turns the content stream of a request into params
pub trait ContentParser: Send + Sync {
    /// Parses `content`, rejecting it when it is longer than `max_length` bytes.
    /// Uploaded files are stored at paths starting with `upload_prefix`
    fn parse(
        &self,
        req: &HttpRequest,
        content: HttpContent,
        max_length: u64,
        upload_prefix: &str,
    ) -> impl Future<Output = Result<Params, ContentError>> + Send;
}

/// Parser for urlencoded forms, JSON objects and multipart forms
///
/// Other media types produce no params and their content is left unread
#[derive(Debug, Clone, Copy, Default)]
pub struct FormParser;

/// Reads everything, up to `max_length` bytes
pub(crate) async fn read_limited(content: HttpContent, max_length: u64) -> Result<Vec<u8>, ContentError> {
    let mut buf = vec![];
    content.take(max_length.saturating_add(1)).read_to_end(&mut buf).await?;
    if buf.len() as u64 > max_length {
        return Err(ContentError::TooLarge { limit: max_length });
    }
    Ok(buf)
}

impl ContentParser for FormParser {
    async fn parse(&self, req: &HttpRequest, content: HttpContent, max_length: u64, upload_prefix: &str) -> Result<Params, ContentError> {
        if let Some(len) = req.content_length() && len > max_length {
            return Err(ContentError::TooLarge { limit: max_length });
        }

        match req.media_type().as_deref() {
            Some("application/x-www-form-urlencoded") => {
                let bytes = read_limited(content, max_length).await?;
                Ok(query::parse(&String::from_utf8_lossy(&bytes)))
            }
            Some("application/json") => {
                let bytes = read_limited(content, max_length).await?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Params::new());
                }
                match serde_json::from_slice::<Value>(&bytes) {
                    Ok(Value::Object(params)) => Ok(params),
                    Ok(_) => Err(ContentError::Malformed("json content is not an object".to_string())),
                    Err(e) => Err(ContentError::Malformed(e.to_string())),
                }
            }
            Some("multipart/form-data") => {
                let boundary = req.content_type()
                    .and_then(multipart::boundary)
                    .ok_or_else(|| ContentError::Malformed("multipart content without a boundary".to_string()))?;
                let bytes = read_limited(content, max_length).await?;
                multipart::parse(&bytes, &boundary, upload_prefix).await
            }
            _ => Ok(Params::new()),
        }
    }
}

impl From<io::Error> for ContentError {
    fn from(err: io::Error) -> ContentError {
        ContentError::Io { kind: err.kind(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn req(content_type: &str) -> HttpRequest {
        HttpRequest::builder().method("POST").header("Content-Type", content_type).build().unwrap()
    }

    fn content(bytes: &'static [u8]) -> HttpContent {
        Box::new(bytes)
    }

    #[tokio::test]
    async fn urlencoded() {
        let params = FormParser.parse(&req("application/x-www-form-urlencoded"), content(b"a=1&b=two+words"), 1024, "").await.unwrap();
        assert_eq!(params["a"], "1");
        assert_eq!(params["b"], "two words");
    }

    #[tokio::test]
    async fn json() {
        let params = FormParser.parse(&req("application/json; charset=utf-8"), content(br#"{"n": 5, "tags": ["x"]}"#), 1024, "").await.unwrap();
        assert_eq!(params["n"], json!(5));
        assert_eq!(params["tags"], json!(["x"]));

        let err = FormParser.parse(&req("application/json"), content(b"[1, 2]"), 1024, "").await.unwrap_err();
        assert!(matches!(err, ContentError::Malformed(_)));
    }

    #[tokio::test]
    async fn too_large() {
        let err = FormParser.parse(&req("application/x-www-form-urlencoded"), content(b"a=123456789"), 4, "").await.unwrap_err();
        assert_eq!(err, ContentError::TooLarge { limit: 4 });

        // declared length is checked before reading
        let req = HttpRequest::builder()
            .header("Content-Type", "application/json")
            .header("Content-Length", "100")
            .build().unwrap();
        let err = FormParser.parse(&req, content(b"{}"), 10, "").await.unwrap_err();
        assert_eq!(err, ContentError::TooLarge { limit: 10 });
    }

    #[tokio::test]
    async fn unknown_type() {
        let params = FormParser.parse(&req("text/plain"), content(b"a=1"), 1024, "").await.unwrap();
        assert!(params.is_empty());
    }
}
