//! Outermost boundary between a transport and the app
//!
//! A transport (an HTTP listener, a test harness, a FastCGI bridge) builds an [`HttpRequest`]
//! and hands it to [`HttpServer::handle`], which always produces a response

use crate::core::{HttpService, HttpServiceRaw, HttpErrorHandler, HttpErrorType, HttpLogger};
use crate::reqres::{HttpRequest, HttpResponse};
use crate::services::{DefaultService, DefaultLogger, ErrorPageHandler};

/// Top-level app with its error rendering and logging
pub struct HttpServer {
    /// Goes into the `Server` header, skipped when empty
    pub name: String,
    pub service: Box<dyn HttpServiceRaw>,
    pub error_handler: Box<dyn HttpErrorHandler>,
    pub logger: Box<dyn HttpLogger>,
}

impl HttpServer {
    pub fn new() -> HttpServer {
        HttpServer {
            name: "dstack".to_string(),
            service: Box::new(DefaultService),
            error_handler: Box::new(ErrorPageHandler { name: "dstack".to_string() }),
            logger: Box::new(DefaultLogger),
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn service(&mut self, service: impl HttpService) -> &mut Self {
        self.service = Box::new(service);
        self
    }

    pub fn error_handler(&mut self, error_handler: impl HttpErrorHandler) -> &mut Self {
        self.error_handler = Box::new(error_handler);
        self
    }

    pub fn logger(&mut self, logger: impl HttpLogger) -> &mut Self {
        self.logger = Box::new(logger);
        self
    }
}

impl Default for HttpServer {
    fn default() -> HttpServer {
        HttpServer::new()
    }
}

impl HttpServer {
    /// Dispatches `req` to the service and turns any failure into an error page
    ///
    /// Failures are also reported through the request's error hook
    pub async fn handle(&self, req: &HttpRequest) -> HttpResponse {
        let mut res = match req.call(&self.service).await {
            Ok(res) => {
                self.logger.log(req, &res);
                res
            }
            Err(err) => {
                let mut handled = match err.error_type() {
                    // nothing to shut down here, the transport owns the connection
                    HttpErrorType::Fatal | HttpErrorType::Hidden => self.error_handler.plain_code(err.status_code()),
                    HttpErrorType::User => self.error_handler.error(req, err.as_ref()),
                };
                // Always use the original status code in the error response
                handled.status = err.status_code();
                req.report_error(&format!("{}: {}", err.name(), err));
                match err.error_type() {
                    HttpErrorType::User => self.logger.err(req, &handled, err.as_ref()),
                    _ => self.logger.log(req, &handled),
                }
                handled
            }
        };

        // Add our server name
        if !self.name.is_empty() {
            res.headers.set("Server", &self.name);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::HttpResult;
    use crate::reqres::{HttpMessage, StatusCode};
    use crate::services::{BasicAuth, NoLogger};

    fn server(service: impl HttpService) -> HttpServer {
        let mut server = HttpServer::new();
        server.service(service).logger(NoLogger);
        server
    }

    fn req(reported: &Arc<Mutex<Vec<String>>>) -> HttpRequest {
        let reported = Arc::clone(reported);
        HttpRequest::builder()
            .path("/x")
            .on_error(move |msg| reported.lock().unwrap().push(msg.to_string()))
            .build().unwrap()
    }

    struct Failing;
    impl HttpService for Failing {
        type Output = HttpResponse;
        async fn request(&self, _req: &HttpRequest) -> HttpResult {
            Err(io::Error::other("boom").into())
        }
    }

    struct Gone;
    impl HttpService for Gone {
        type Output = HttpResponse;
        async fn request(&self, _req: &HttpRequest) -> HttpResult {
            Err(StatusCode(410).into())
        }
    }

    #[tokio::test]
    async fn success_gets_server_header() {
        let reported = Arc::default();
        let res = server(DefaultService).handle(&req(&reported)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.header("Server"), Some("dstack"));
        assert!(reported.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn errors_become_pages() {
        let reported = Arc::default();
        let res = server(Failing).handle(&req(&reported)).await;
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.media_type().as_deref(), Some("text/html"));
        assert_eq!(*reported.lock().unwrap(), ["io::Error: boom"]);
    }

    #[tokio::test]
    async fn status_codes_keep_their_code() {
        let reported = Arc::default();
        let res = server(Gone).handle(&req(&reported)).await;
        assert_eq!(res.status, StatusCode(410));
        assert_eq!(reported.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn auth_failures_are_not_reported() {
        let reported = Arc::default();
        let auth = BasicAuth::new(DefaultService, |_: &str, _: &str| false);
        let res = server(auth).handle(&req(&reported)).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert!(reported.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_name_skips_header() {
        let reported = Arc::default();
        let mut server = server(DefaultService);
        server.name("");
        let res = server.handle(&req(&reported)).await;
        assert_eq!(res.header("Server"), None);
    }
}
