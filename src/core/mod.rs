//! Core traits

mod service;
pub use service::{HttpService, HttpServiceRaw, BoxFuture};
mod error;
pub use error::{HttpError, HttpErrorType, ConfigError, DispatchError};
pub(crate) use error::short_type_name;
mod logger;
pub use logger::HttpLogger;
mod errorhandler;
pub use errorhandler::HttpErrorHandler;

use crate::reqres::HttpResponse;
/// Result for [`HttpService`]
pub type HttpResult<T = HttpResponse> = Result<T, Box<dyn HttpError>>;
