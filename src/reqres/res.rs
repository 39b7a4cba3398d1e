//! HTTP response, its normalization and constructors

use crate::reqres::{HttpHeaders, HttpBody, HttpMessage, StatusCode};

/// Canonical response, what every dispatch resolves to
#[derive(Debug)]
#[non_exhaustive]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HttpHeaders,
    pub content: HttpBody,
}

impl HttpResponse {
    /// Builds a response from its three parts
    pub fn new(status: StatusCode, headers: impl Into<HttpHeaders>, content: impl Into<HttpBody>) -> HttpResponse {
        HttpResponse { status, headers: headers.into(), content: content.into() }
    }

    /// Constructs new `200 OK` response with a specified `Content-Type`
    pub fn with_type(content_type: &str, body: impl Into<HttpBody>) -> HttpResponse {
        let mut headers = HttpHeaders::new();
        if !content_type.is_empty() {
            headers.set("Content-Type", content_type);
        }
        HttpResponse::new(StatusCode::OK, headers, body)
    }

    /// Replaces the status code
    pub fn with_status(mut self, status: StatusCode) -> HttpResponse {
        self.status = status;
        self
    }

    /// Pushes a new header
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut HttpResponse {
        self.headers.add(name, value);
        self
    }
}

impl Default for HttpResponse {
    fn default() -> HttpResponse {
        HttpResponse::new(StatusCode::OK, HttpHeaders::new(), HttpBody::Empty)
    }
}

impl HttpMessage for HttpResponse {
    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }
}

/// Plain `{status, headers, content}` shape, normalized by dispatch
#[derive(Debug, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub content: HttpBody,
}

/// Why a value could not become an [`HttpResponse`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    /// There was no response at all
    Missing,
    /// Status code is outside of `100..=599`
    InvalidStatus(u16),
}

/// Anything an app is allowed to resolve to
///
/// Implemented for [`HttpResponse`] (passed through as is), [`RawResponse`],
/// [`StatusCode`] (empty body), `(status, headers, content)` tuples and [`Option`] of those,
/// where `None` is always an error
pub trait IntoHttpResponse: Send {
    fn into_response(self) -> Result<HttpResponse, ShapeError>;
}

impl IntoHttpResponse for HttpResponse {
    fn into_response(self) -> Result<HttpResponse, ShapeError> {
        Ok(self)
    }
}

impl IntoHttpResponse for RawResponse {
    fn into_response(self) -> Result<HttpResponse, ShapeError> {
        let status = StatusCode(self.status);
        if !status.is_valid() { return Err(ShapeError::InvalidStatus(self.status)); }
        Ok(HttpResponse::new(status, self.headers, self.content))
    }
}

impl IntoHttpResponse for StatusCode {
    fn into_response(self) -> Result<HttpResponse, ShapeError> {
        RawResponse { status: self.0, ..Default::default() }.into_response()
    }
}

impl<H, B> IntoHttpResponse for (u16, H, B)
where
    H: Into<HttpHeaders> + Send,
    B: Into<HttpBody> + Send,
{
    fn into_response(self) -> Result<HttpResponse, ShapeError> {
        let (status, headers, content) = self;
        RawResponse { status, headers: headers.into(), content: content.into() }.into_response()
    }
}

impl<T: IntoHttpResponse> IntoHttpResponse for Option<T> {
    fn into_response(self) -> Result<HttpResponse, ShapeError> {
        self.ok_or(ShapeError::Missing)?.into_response()
    }
}

/// Plaintext response (`text/plain`)
pub fn text(text: impl Into<String>) -> HttpResponse {
    HttpResponse::with_type("text/plain; charset=utf-8", text.into())
}

/// HTML response (`text/html`)
pub fn html(html: impl Into<String>) -> HttpResponse {
    HttpResponse::with_type("text/html; charset=utf-8", html.into())
}

/// JSON response (`application/json`)
pub fn json(json: &serde_json::Value) -> HttpResponse {
    HttpResponse::with_type("application/json", json.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_is_normalized() {
        let raw = RawResponse { status: 201, headers: HttpHeaders::from([("X-Id", "7")]), content: "made".into() };
        let res = raw.into_response().unwrap();
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.header("x-id"), Some("7"));
        assert_eq!(res.content.len(), Some(4));
    }

    #[test]
    fn tuple_and_code() {
        let res = (404u16, [("Content-Type", "text/plain")], "gone").into_response().unwrap();
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.media_type().as_deref(), Some("text/plain"));

        let res = StatusCode::NO_CONTENT.into_response().unwrap();
        assert!(res.content.is_empty());
    }

    #[test]
    fn rejects_bad_shapes() {
        assert_eq!(None::<HttpResponse>.into_response().unwrap_err(), ShapeError::Missing);
        assert_eq!(StatusCode(42).into_response().unwrap_err(), ShapeError::InvalidStatus(42));
    }

    #[test]
    fn constructors() {
        let res = text("hi");
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.content_type(), Some("text/plain; charset=utf-8"));

        let res = json(&serde_json::json!({"a": 1}));
        assert_eq!(res.media_type().as_deref(), Some("application/json"));
    }
}
