use std::fmt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use tokio::io::AsyncRead;
use tokio::sync::OnceCell;

use crate::core::ConfigError;
use crate::params::{self, Params, ContentError};
use crate::reqres::{HttpHeaders, HttpContent, HttpMessage, RequestDefaults, ErrorHook, CloseHook, cookie};

/// Version used in request
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HttpVersion {
    pub major: u8,
    pub minor: u8,
}

impl HttpVersion {
    /// Compares this version for equality
    pub fn is(self, major: u8, minor: u8) -> bool {
        self.major == major && self.minor == minor
    }

    /// Parses `1.1` (an `HTTP/` prefix is allowed)
    pub fn parse(ver: &str) -> Option<HttpVersion> {
        let ver = ver.strip_prefix("HTTP/").unwrap_or(ver);
        let (major, minor) = ver.split_once('.')?;
        Some(HttpVersion { major: major.parse().ok()?, minor: minor.parse().ok()? })
    }
}

impl fmt::Debug for HttpVersion {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "HTTP/{}.{}", self.major, self.minor)
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}.{}", self.major, self.minor)
    }
}

/// Method of request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get, Head, Post, Put, Delete, Connect, Options, Trace, Patch,
    // it is not possible to add new variants here because for example
    // Get and Other("GET") would not be equal
    // but it is not possible to private enum variants in rust
    Other(String)
}

impl HttpMethod {
    /// Parses method from provided str, case-insensitively
    pub fn new(method: &str) -> HttpMethod {
        let method = method.to_ascii_uppercase();
        match method.as_str() {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "CONNECT" => HttpMethod::Connect,
            "OPTIONS" => HttpMethod::Options,
            "TRACE" => HttpMethod::Trace,
            "PATCH" => HttpMethod::Patch,
            _ => HttpMethod::Other(method),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Other(other) => other,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(self.as_str())
    }
}

/// Lazily computed views of a request, each filled on first access
#[derive(Default)]
struct Derived {
    protocol: OnceLock<String>,
    host: OnceLock<String>,
    port: OnceLock<String>,
    remote_host: OnceLock<String>,
    pathname: OnceLock<String>,
    search: OnceLock<String>,
    path: OnceLock<String>,
    url: OnceLock<String>,
    base_url: OnceLock<String>,
    cookies: OnceLock<HashMap<String, String>>,
    query: OnceLock<Params>,
}

/// Request from client to handle
///
/// Created by the transport for every exchange and borrowed by the whole app chain.
/// Metadata never changes after construction, so every derived property is computed once
pub struct HttpRequest {
    method: HttpMethod,
    protocol: String,
    version: HttpVersion,
    headers: HttpHeaders,
    content: Mutex<Option<HttpContent>>,
    on_error: ErrorHook,
    on_close: CloseHook,
    remote_host: String,
    remote_port: String,
    server_name: String,
    server_port: String,
    script_name: String,
    path_info: String,
    query_string: String,
    remote_user: Mutex<Option<String>>,
    derived: Derived,
    pub(crate) params: OnceCell<Result<Params, ContentError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Splits `host:port`, keeping IPv6 literals intact
fn split_port(host: &str) -> (&str, Option<&str>) {
    if let Some((name, port)) = host.rsplit_once(':')
        && !port.is_empty()
        && port.bytes().all(|b| b.is_ascii_digit())
        && (!name.contains(':') || name.ends_with(']'))
    {
        (name, Some(port))
    } else {
        (host, None)
    }
}

impl HttpRequest {
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn protocol_version(&self) -> HttpVersion {
        self.version
    }

    /// Client address as seen by the connection, ignoring proxies
    pub fn connection_remote_host(&self) -> &str {
        &self.remote_host
    }

    pub fn remote_port(&self) -> &str {
        &self.remote_port
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn server_port(&self) -> &str {
        &self.server_port
    }

    /// Part of the path the request was mounted on
    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    /// Rest of the path, `/` when both this and `script_name` would be empty
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// Raw query string, without the `?`
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// `https:` behind an SSL-terminating proxy, `X-Forwarded-Proto` (first value) if present,
    /// otherwise the connection protocol. Always ends with a colon
    pub fn protocol(&self) -> &str {
        self.derived.protocol.get_or_init(|| {
            if self.header("X-Forwarded-Ssl") == Some("on") {
                "https:".to_string()
            } else if let Some(proto) = self.header("X-Forwarded-Proto") {
                let first = proto.split(',').next().unwrap_or_default().trim();
                format!("{first}:")
            } else {
                self.protocol.clone()
            }
        })
    }

    pub fn is_ssl(&self) -> bool {
        self.protocol() == "https:"
    }

    /// Was this request sent with `XMLHttpRequest`?
    pub fn is_xhr(&self) -> bool {
        self.header("X-Requested-With") == Some("XMLHttpRequest")
    }

    /// `X-Forwarded-Host` (last value), else `Host`, else `server_name[:server_port]`
    pub fn host(&self) -> &str {
        self.derived.host.get_or_init(|| {
            if let Some(forwarded) = self.header("X-Forwarded-Host") {
                // every proxy appends to the list, the last one is the closest to us
                forwarded.split([',', ' ']).filter(|h| !h.is_empty()).last().unwrap_or_default().to_string()
            } else if let Some(host) = self.header("Host") {
                host.to_string()
            } else if !self.server_port.is_empty() && self.server_port != "0" {
                format!("{}:{}", self.server_name, self.server_port)
            } else {
                self.server_name.clone()
            }
        })
    }

    /// [`host`](HttpRequest::host) without the port
    pub fn hostname(&self) -> &str {
        split_port(self.host()).0
    }

    pub fn port(&self) -> &str {
        self.derived.port.get_or_init(|| {
            if let (_, Some(port)) = split_port(self.host()) {
                port.to_string()
            } else if let Some(port) = self.header("X-Forwarded-Port") {
                port.to_string()
            } else if self.is_ssl() {
                "443".to_string()
            } else if self.header("X-Forwarded-Host").is_some() {
                "80".to_string()
            } else {
                self.server_port.clone()
            }
        })
    }

    /// Client address, `X-Forwarded-For` takes precedence over the connection address
    pub fn remote_host(&self) -> &str {
        self.derived.remote_host.get_or_init(|| {
            self.header("X-Forwarded-For").unwrap_or(&self.remote_host).to_string()
        })
    }

    /// `script_name + path_info`
    pub fn pathname(&self) -> &str {
        self.derived.pathname.get_or_init(|| format!("{}{}", self.script_name, self.path_info))
    }

    /// `?query_string`, or nothing when it is empty
    pub fn search(&self) -> &str {
        self.derived.search.get_or_init(|| {
            if self.query_string.is_empty() {
                String::new()
            } else {
                format!("?{}", self.query_string)
            }
        })
    }

    /// `pathname + search`
    pub fn path(&self) -> &str {
        self.derived.path.get_or_init(|| format!("{}{}", self.pathname(), self.search()))
    }

    /// Full reconstructed URL
    pub fn url(&self) -> &str {
        self.derived.url.get_or_init(|| format!("{}//{}{}", self.protocol(), self.host(), self.path()))
    }

    /// URL of the point this request was mounted on (`protocol//host + script_name`)
    pub fn base_url(&self) -> &str {
        self.derived.base_url.get_or_init(|| format!("{}//{}{}", self.protocol(), self.host(), self.script_name))
    }

    /// Cookies from the `Cookie` header, the first occurrence of a name wins
    pub fn cookies(&self) -> &HashMap<String, String> {
        self.derived.cookies.get_or_init(|| cookie::parse(self.header("Cookie").unwrap_or_default()))
    }

    /// Decoded query string
    pub fn query(&self) -> &Params {
        self.derived.query.get_or_init(|| params::query::parse(&self.query_string))
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header("User-Agent")
    }

    pub fn referrer(&self) -> Option<&str> {
        self.header("Referer")
    }

    /// Identity established by an authentication middleware
    pub fn remote_user(&self) -> Option<String> {
        lock(&self.remote_user).clone()
    }

    pub fn set_remote_user(&self, user: impl Into<String>) {
        *lock(&self.remote_user) = Some(user.into());
    }

    /// Moves the content stream out, it can only be taken once
    pub fn take_content(&self) -> Option<HttpContent> {
        lock(&self.content).take()
    }

    /// Passes a diagnostic message to the error hook
    pub fn report_error(&self, message: &str) {
        (self.on_error)(message)
    }

    /// Called by the transport when the connection has closed
    ///
    /// This is only a notification, nothing in flight is cancelled
    pub fn notify_close(&self) {
        (self.on_close)()
    }
}

impl HttpMessage for HttpRequest {
    fn headers(&self) -> &HttpHeaders {
        &self.headers
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("protocol", &self.protocol)
            .field("version", &self.version)
            .field("headers", &self.headers)
            .field("remote_host", &self.remote_host)
            .field("remote_port", &self.remote_port)
            .field("server_name", &self.server_name)
            .field("server_port", &self.server_port)
            .field("script_name", &self.script_name)
            .field("path_info", &self.path_info)
            .field("query_string", &self.query_string)
            .finish_non_exhaustive()
    }
}

/// Options of a new [`HttpRequest`]
///
/// Everything is optional, unset values are `GET`, `http:`, `1.0`, port `0` and empty strings
#[derive(Default)]
pub struct HttpRequestBuilder {
    method: Option<String>,
    protocol: Option<String>,
    version: Option<String>,
    headers: HttpHeaders,
    content: Option<HttpContent>,
    on_error: Option<ErrorHook>,
    on_close: Option<CloseHook>,
    remote_host: String,
    remote_port: Option<String>,
    server_name: String,
    server_port: Option<String>,
    script_name: String,
    path_info: Option<String>,
    path: Option<String>,
    query_string: Option<String>,
    defaults: Option<RequestDefaults>,
}

impl HttpRequestBuilder {
    pub fn method(mut self, method: &str) -> Self {
        self.method = Some(method.to_string());
        self
    }

    /// `http` or `https`, a trailing colon is allowed
    pub fn protocol(mut self, protocol: &str) -> Self {
        self.protocol = Some(protocol.to_string());
        self
    }

    pub fn protocol_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn headers(mut self, headers: impl Into<HttpHeaders>) -> Self {
        self.headers = headers.into();
        self
    }

    pub fn content(mut self, content: impl AsyncRead + Send + Unpin + 'static) -> Self {
        self.content = Some(Box::new(content));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(hook));
        self
    }

    pub fn remote_host(mut self, host: impl Into<String>) -> Self {
        self.remote_host = host.into();
        self
    }

    pub fn remote_port(mut self, port: impl ToString) -> Self {
        self.remote_port = Some(port.to_string());
        self
    }

    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn server_port(mut self, port: impl ToString) -> Self {
        self.server_port = Some(port.to_string());
        self
    }

    pub fn script_name(mut self, script_name: impl Into<String>) -> Self {
        self.script_name = script_name.into();
        self
    }

    pub fn path_info(mut self, path_info: impl Into<String>) -> Self {
        self.path_info = Some(path_info.into());
        self
    }

    /// Path with an optional query (`/search?q=1`), an alternative to `path_info` + `query_string`
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn query_string(mut self, query_string: impl Into<String>) -> Self {
        self.query_string = Some(query_string.into());
        self
    }

    /// Hooks to fall back on, [`RequestDefaults::platform`] if never called
    pub fn defaults(mut self, defaults: &RequestDefaults) -> Self {
        self.defaults = Some(defaults.clone());
        self
    }

    pub fn build(self) -> Result<HttpRequest, ConfigError> {
        let defaults = self.defaults.unwrap_or_else(|| RequestDefaults::platform().clone());
        let on_error = self.on_error.or(defaults.on_error).ok_or(ConfigError::MissingErrorHandler)?;
        let on_close = self.on_close.or(defaults.on_close).ok_or(ConfigError::MissingCloseHandler)?;

        let protocol = match self.protocol {
            Some(protocol) => {
                let name = protocol.trim_end_matches(':').to_ascii_lowercase();
                if name != "http" && name != "https" {
                    return Err(ConfigError::InvalidProtocol(protocol));
                }
                format!("{name}:")
            }
            None => "http:".to_string(),
        };

        let version = match self.version {
            Some(version) => HttpVersion::parse(&version).ok_or(ConfigError::InvalidVersion(version))?,
            None => HttpVersion { major: 1, minor: 0 },
        };

        let (mut path_info, mut query_string) = (self.path_info.unwrap_or_default(), String::new());
        if let Some(path) = self.path {
            match path.split_once('?') {
                Some((p, q)) => (path_info, query_string) = (p.to_string(), q.to_string()),
                None => path_info = path,
            }
        }
        if let Some(qs) = self.query_string {
            query_string = qs;
        }
        if self.script_name.is_empty() && path_info.is_empty() {
            path_info = "/".to_string();
        }

        Ok(HttpRequest {
            method: HttpMethod::new(self.method.as_deref().unwrap_or("GET")),
            protocol,
            version,
            headers: self.headers,
            content: Mutex::new(self.content),
            on_error,
            on_close,
            remote_host: self.remote_host,
            remote_port: self.remote_port.unwrap_or_else(|| "0".to_string()),
            server_name: self.server_name,
            server_port: self.server_port.unwrap_or_else(|| "0".to_string()),
            script_name: self.script_name,
            path_info,
            query_string,
            remote_user: Mutex::new(None),
            derived: Derived::default(),
            params: OnceCell::new(),
        })
    }
}
