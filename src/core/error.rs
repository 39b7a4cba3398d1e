use std::io::{self, ErrorKind};
use std::error::Error;
use std::fmt;

use crate::reqres::StatusCode;

/// How should this error be handled
///
/// Returned from [`HttpError::error_type`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorType {
    /// The exchange cannot continue (examples: network I/O error)
    Fatal,
    /// Status code only, details are not shown to the client (examples: 404 Not found, a panic)
    Hidden,
    /// Error with detailed description (could not parse json, wrong content type, etc)
    User,
}

/// Error trait for any service error
/// # Example implementation
/// `impl HttpError for MyError {}`
pub trait HttpError: Error + Send + Sync + 'static {
    /// Name of this error (type name by default)
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }

    /// How should this error be handled, check [`HttpErrorType`] for more info (`User` by default)
    fn error_type(&self) -> HttpErrorType {
        HttpErrorType::User
    }

    /// Provides HTTP-friendly description of this error (`.to_string()` by default)
    fn http_description(&self) -> String {
        self.to_string()
    }

    /// Which status code should be used for this error
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl<E: HttpError> From<E> for Box<dyn HttpError> {
    fn from(value: E) -> Box<dyn HttpError> {
        Box::new(value)
    }
}

/// Everything after the last `::` of a type name
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    // generics may contain `::` too, cut them off first
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

fn is_net(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::ConnectionRefused
    | ErrorKind::ConnectionReset
    | ErrorKind::HostUnreachable
    | ErrorKind::NetworkUnreachable
    | ErrorKind::ConnectionAborted
    | ErrorKind::NotConnected
    | ErrorKind::NetworkDown
    | ErrorKind::BrokenPipe
    | ErrorKind::TimedOut)
}

impl HttpError for io::Error {
    fn name(&self) -> &'static str {
        "io::Error"
    }

    fn error_type(&self) -> HttpErrorType {
        if is_net(self.kind()) {
            HttpErrorType::Fatal
        } else {
            HttpErrorType::User
        }
    }
}

impl HttpError for std::string::FromUtf8Error {}

impl HttpError for serde_json::Error {
    fn name(&self) -> &'static str {
        "serde_json::Error"
    }
}

/// Invalid setup of a request, a server or a middleware
///
/// Always returned synchronously from constructors, never from a running exchange
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Neither the request nor its defaults provide an error hook
    MissingErrorHandler,
    /// Neither the request nor its defaults provide a close hook
    MissingCloseHandler,
    /// Protocol is not `http` or `https`
    InvalidProtocol(String),
    /// Protocol version is not `major.minor`
    InvalidVersion(String),
    /// [`BasicAuth`](crate::services::BasicAuth) was built without a validator
    MissingValidator,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::MissingErrorHandler => fmt.write_str("request has no error handler and no default one is configured"),
            ConfigError::MissingCloseHandler => fmt.write_str("request has no close handler and no default one is configured"),
            ConfigError::InvalidProtocol(p) => write!(fmt, "invalid protocol `{p}`, expected `http` or `https`"),
            ConfigError::InvalidVersion(v) => write!(fmt, "invalid protocol version `{v}`"),
            ConfigError::MissingValidator => fmt.write_str("basic auth requires a validate function"),
        }
    }
}

impl Error for ConfigError {}
impl HttpError for ConfigError {}

/// An app broke the dispatch contract
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DispatchError {
    /// App resolved to `None`
    NoResponse { app: &'static str },
    /// App produced a status code outside of `100..=599`
    InvalidStatus { app: &'static str, status: u16 },
    /// App panicked, either while being invoked or while its future was polled
    Panicked { app: &'static str, message: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DispatchError::NoResponse { app } => write!(fmt, "app `{app}` did not return a response"),
            DispatchError::InvalidStatus { app, status } => write!(fmt, "app `{app}` returned invalid status code {status}"),
            DispatchError::Panicked { app, message } => write!(fmt, "app `{app}` panicked: {message}"),
        }
    }
}

impl Error for DispatchError {}

impl HttpError for DispatchError {
    fn error_type(&self) -> HttpErrorType {
        match self {
            // This is a panic message, should not be displayed
            DispatchError::Panicked { .. } => HttpErrorType::Hidden,
            _ => HttpErrorType::User,
        }
    }
}
