use crate::core::HttpError;
use crate::reqres::{HttpRequest, HttpResponse};

/// Records finished exchanges
pub trait HttpLogger: Send + Sync + 'static {
    /// A response was produced
    fn log(&self, req: &HttpRequest, res: &HttpResponse);
    /// An app failed and `res` was rendered from `error`
    fn err(&self, req: &HttpRequest, res: &HttpResponse, error: &dyn HttpError);
}
