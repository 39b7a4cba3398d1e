use tracing::instrument;

use crate::core::{HttpError, HttpErrorHandler};
use crate::reqres::{res, HttpRequest, HttpResponse, StatusCode};
use crate::util::escape;

fn error_page(code: StatusCode, desc: &str, name: &str) -> String {
    let reason = code.as_str();
    let desc = escape::html(desc);
    let name = escape::html(name);
format!(r#"<!doctype html>
<html><title>{code} {reason}</title><meta name="viewport" content="width=device-width"><style>*{{font-family:sans-serif;color:#0e1219;background:#f9f9f9}}@media(prefers-color-scheme:dark){{*{{color:#d8c547;background:#0e1219}}}}h1{{margin:0}}main{{max-width:40em;margin:4em auto;padding:8px;border-top:4px solid}}</style><main>
<h1>{code} {reason}</h1>
<p>{desc}</p>
<hr>
<small>{name}</small>
</main></html>
"#)
}

/// Default error handler, renders an HTML error page
#[derive(Debug)]
pub struct ErrorPageHandler {
    /// Signature at the bottom of the page
    pub name: String,
}

impl HttpErrorHandler for ErrorPageHandler {
    #[instrument(skip(self, _req, error), fields(error = error.name()))]
    fn error(&self, _req: &HttpRequest, error: &dyn HttpError) -> HttpResponse {
        let code = error.status_code();
        res::html(error_page(code, &error.http_description(), &self.name)).with_status(code)
    }

    #[instrument]
    fn plain_code(&self, code: StatusCode) -> HttpResponse {
        res::html(error_page(code, "", &self.name)).with_status(code)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::reqres::HttpMessage;

    #[tokio::test]
    async fn escapes_descriptions() {
        let handler = ErrorPageHandler { name: "dstack".to_string() };
        let req = HttpRequest::builder().build().unwrap();
        let err = io::Error::other("<script>alert(1)</script>");
        let res = handler.error(&req, &err);
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.content_type(), Some("text/html; charset=utf-8"));
        let page = String::from_utf8(res.content.into_bytes().await.unwrap()).unwrap();
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("500 Internal server error"));
    }

    #[tokio::test]
    async fn plain_codes() {
        let handler = ErrorPageHandler { name: "dstack".to_string() };
        let res = handler.plain_code(StatusCode::NOT_FOUND);
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        let page = String::from_utf8(res.content.into_bytes().await.unwrap()).unwrap();
        assert!(page.contains("<h1>404 Not found</h1>"));
    }
}
