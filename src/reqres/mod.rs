//! Request, response, status code, and their components

mod status_code;
pub use status_code::StatusCode;
mod headers;
pub use headers::{HttpHeader, HttpHeaders};
mod message;
pub use message::HttpMessage;
mod body;
pub use body::{HttpBody, HttpContent};
mod defaults;
pub use defaults::{RequestDefaults, ErrorHook, CloseHook};
mod req;
pub use req::{HttpRequest, HttpRequestBuilder, HttpVersion, HttpMethod};
mod cookie;

pub mod res;
pub use res::{HttpResponse, RawResponse, IntoHttpResponse, ShapeError};
