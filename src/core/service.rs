use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;

use tracing::debug;

use crate::core::{HttpResult, DispatchError, short_type_name};
use crate::reqres::{HttpRequest, HttpResponse, IntoHttpResponse, ShapeError};
use crate::util::future::{CatchPanic, Panic, panic_message};

/// Basic building block of your web application
///
/// A service turns a request into a response. Middleware is a service holding another one
/// and invoking it with [`HttpRequest::call`]
/// # Example
/// ```
/// # use dstack::prelude::*;
/// # use dstack::reqres::res;
/// struct Hello;
/// impl HttpService for Hello {
///     type Output = HttpResponse;
///     async fn request(&self, req: &HttpRequest) -> HttpResult {
///         Ok(res::text(format!("hello {}", req.remote_user().unwrap_or_default())))
///     }
/// }
/// ```
pub trait HttpService: Send + Sync + 'static {
    /// What this service resolves to, see [`IntoHttpResponse`]
    type Output: IntoHttpResponse;

    /// Serve the request
    ///
    /// Do not call this directly, go through [`HttpRequest::call`] which normalizes the output
    fn request(&self, req: &HttpRequest) -> impl Future<Output = HttpResult<Self::Output>> + Send;
}

/// Boxed future returned by [`HttpServiceRaw`]
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe [`HttpService`], implemented for every service
///
/// Use `Box<dyn HttpServiceRaw>` to store services of different types. The box is a service too
pub trait HttpServiceRaw: Send + Sync + 'static {
    /// Dispatches the request to this service
    fn request_raw<'a>(&'a self, req: &'a HttpRequest) -> BoxFuture<'a, HttpResult>;
}

impl<S: HttpService> HttpServiceRaw for S {
    fn request_raw<'a>(&'a self, req: &'a HttpRequest) -> BoxFuture<'a, HttpResult> {
        Box::pin(req.call(self))
    }
}

impl HttpService for Box<dyn HttpServiceRaw> {
    type Output = HttpResponse;

    fn request(&self, req: &HttpRequest) -> impl Future<Output = HttpResult> + Send {
        async move { (**self).request_raw(req).await }
    }
}

fn panicked(app: &'static str, panic: Panic) -> DispatchError {
    DispatchError::Panicked { app, message: panic_message(&panic) }
}

impl HttpRequest {
    /// Invokes `app` with this request and resolves to its normalized response
    ///
    /// Failures of every kind end up in `Err`: errors returned by the app, panics while
    /// creating or polling its future, a `None` output and an invalid status code.
    /// Nothing is retried
    pub async fn call<S: HttpService>(&self, app: &S) -> HttpResult {
        let name = short_type_name::<S>();
        debug!(app = name, method = %self.method(), path = self.path(), "dispatch");

        let fut = panic::catch_unwind(AssertUnwindSafe(|| app.request(self)))
            .map_err(|panic| panicked(name, panic))?;
        let output = CatchPanic::new(fut).await
            .map_err(|panic| panicked(name, panic))??;

        output.into_response().map_err(|err| match err {
            ShapeError::Missing => DispatchError::NoResponse { app: name }.into(),
            ShapeError::InvalidStatus(status) => DispatchError::InvalidStatus { app: name, status }.into(),
        })
    }
}
