//! Most used types
//!
//! Almost all (except [`StatusCode`], [`Params`] and [`Filters`]) are prefixed with "Http",
//! so don't worry about name conflicts

pub use crate::core::{HttpService, HttpServiceRaw, HttpResult, HttpError, HttpErrorHandler, HttpErrorType, HttpLogger};
pub use crate::reqres::{HttpRequest, HttpResponse, HttpMessage, HttpMethod, StatusCode, RawResponse, IntoHttpResponse};
pub use crate::params::{Params, Filters};
pub use crate::services::BasicAuth;
pub use crate::server::HttpServer;
