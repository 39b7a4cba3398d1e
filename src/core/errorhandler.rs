use crate::core::HttpError;
use crate::reqres::{HttpRequest, HttpResponse, StatusCode};

/// Renders failed exchanges for the client
pub trait HttpErrorHandler: Send + Sync + 'static {
    /// Response for an error whose description may be shown
    fn error(&self, req: &HttpRequest, error: &dyn HttpError) -> HttpResponse;
    /// Response carrying only a status code
    fn plain_code(&self, code: StatusCode) -> HttpResponse;
}
