use crate::core::{HttpService, HttpResult};
use crate::reqres::{res, HttpRequest, HttpResponse};

/// Default service which only returns `"dstack is here!"`
pub struct DefaultService;

impl HttpService for DefaultService {
    type Output = HttpResponse;

    async fn request(&self, _req: &HttpRequest) -> HttpResult {
        Ok(res::text("dstack is here!\n"))
    }
}
