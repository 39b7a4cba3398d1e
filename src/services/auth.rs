//! HTTP Basic authentication
//!
//! [`BasicAuth`] wraps another service and only lets requests through when their
//! `Authorization` header carries credentials accepted by a validator:
//! ```
//! # use dstack::services::{BasicAuth, DefaultService};
//! let app = BasicAuth::new(DefaultService, |user: &str, pass: &str| user == "admin" && pass == "secret")
//!     .realm("Staff only");
//! ```
//! - no `Authorization` header, or an empty one: `401` with a `WWW-Authenticate` challenge
//! - a scheme other than `Basic`, or credentials that do not decode: `400`
//! - rejected credentials: `401`
//! - accepted credentials: the identity is stored with [`HttpRequest::set_remote_user`] and
//!   the wrapped service is called

use std::future::Future;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::debug;

use crate::core::{HttpService, HttpResult, ConfigError};
use crate::reqres::{HttpRequest, HttpResponse, HttpMessage, StatusCode};

/// Realm used when none was configured
pub const DEFAULT_REALM: &str = "Authorization Required";

/// Outcome of credentials validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Answer with a challenge
    Denied,
    /// The username becomes the identity
    Granted,
    /// This name becomes the identity instead of the username
    GrantedAs(String),
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Verdict {
        if ok { Verdict::Granted } else { Verdict::Denied }
    }
}

impl From<String> for Verdict {
    fn from(name: String) -> Verdict {
        if name.is_empty() { Verdict::Denied } else { Verdict::GrantedAs(name) }
    }
}

impl From<&str> for Verdict {
    fn from(name: &str) -> Verdict {
        Verdict::from(name.to_string())
    }
}

impl From<Option<String>> for Verdict {
    fn from(name: Option<String>) -> Verdict {
        name.map_or(Verdict::Denied, Verdict::from)
    }
}

/// Checks a username and password
///
/// Implemented for every `Fn(&str, &str) -> impl Into<Verdict>`. Implement it by hand when
/// the check has to wait on something:
/// ```
/// # use dstack::prelude::*;
/// # use dstack::services::{Validate, Verdict};
/// struct Accounts;
/// impl Validate for Accounts {
///     async fn validate(&self, user: &str, _pass: &str) -> HttpResult<Verdict> {
///         tokio::task::yield_now().await;
///         Ok((user == "root").then(|| "administrator".to_string()).into())
///     }
/// }
/// ```
/// Errors are passed to the caller of the middleware untouched
pub trait Validate: Send + Sync + 'static {
    fn validate(&self, username: &str, password: &str) -> impl Future<Output = HttpResult<Verdict>> + Send;
}

impl<F, V> Validate for F
where
    F: Fn(&str, &str) -> V + Send + Sync + 'static,
    V: Into<Verdict>,
{
    async fn validate(&self, username: &str, password: &str) -> HttpResult<Verdict> {
        Ok(self(username, password).into())
    }
}

/// Validator slot of a [`BasicAuthBuilder`] that was never filled
pub type Unset = fn(&str, &str) -> bool;

/// Basic authentication middleware, see the [module docs](self)
pub struct BasicAuth<S, V> {
    app: S,
    validate: V,
    realm: String,
}

impl<S: HttpService, V: Validate> BasicAuth<S, V> {
    /// Protects `app` with `validate` in the default realm
    pub fn new(app: S, validate: V) -> BasicAuth<S, V> {
        BasicAuth { app, validate, realm: DEFAULT_REALM.to_string() }
    }

    /// Replaces the realm shown in challenges
    pub fn realm(mut self, realm: impl Into<String>) -> BasicAuth<S, V> {
        self.realm = realm.into();
        self
    }

    fn challenge(&self) -> HttpResponse {
        let mut res = HttpResponse::with_type("text/plain", "Not Authorized")
            .with_status(StatusCode::UNAUTHORIZED);
        res.headers.set("WWW-Authenticate", format!("Basic realm=\"{}\"", self.realm));
        res
    }
}

impl<S: HttpService> BasicAuth<S, Unset> {
    /// Starts a builder, for when the validator is chosen at runtime
    pub fn builder(app: S) -> BasicAuthBuilder<S, Unset> {
        BasicAuthBuilder::new(app)
    }
}

/// Builder for [`BasicAuth`]
pub struct BasicAuthBuilder<S, V> {
    app: S,
    validate: Option<V>,
    realm: Option<String>,
}

impl<S: HttpService> BasicAuthBuilder<S, Unset> {
    pub fn new(app: S) -> BasicAuthBuilder<S, Unset> {
        BasicAuthBuilder { app, validate: None, realm: None }
    }
}

impl<S: HttpService, V: Validate> BasicAuthBuilder<S, V> {
    pub fn validate<V2: Validate>(self, validate: V2) -> BasicAuthBuilder<S, V2> {
        BasicAuthBuilder { app: self.app, validate: Some(validate), realm: self.realm }
    }

    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Fails when no validator was given
    pub fn build(self) -> Result<BasicAuth<S, V>, ConfigError> {
        let validate = self.validate.ok_or(ConfigError::MissingValidator)?;
        let auth = BasicAuth::new(self.app, validate);
        Ok(match self.realm {
            Some(realm) => auth.realm(realm),
            None => auth,
        })
    }
}

fn bad_request() -> HttpResponse {
    HttpResponse::with_type("text/plain", "Bad Request").with_status(StatusCode::BAD_REQUEST)
}

/// `Basic dXNlcjpwYXNz` -> `("user", "pass")`, `None` when malformed
fn credentials(header: &str) -> Option<(String, String)> {
    let (scheme, token) = header.split_once(' ').unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(token.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    // the password may contain colons, the username may not
    let (user, pass) = decoded.split_once(':').unwrap_or((decoded.as_str(), ""));
    Some((user.to_string(), pass.to_string()))
}

impl<S: HttpService, V: Validate> HttpService for BasicAuth<S, V> {
    type Output = HttpResponse;

    async fn request(&self, req: &HttpRequest) -> HttpResult {
        // an empty header is no attempt at all
        let Some(header) = req.header("Authorization").map(str::trim).filter(|h| !h.is_empty()) else {
            return Ok(self.challenge());
        };
        let Some((user, pass)) = credentials(header) else {
            debug!(path = req.path(), "malformed basic credentials");
            return Ok(bad_request());
        };

        let identity = match self.validate.validate(&user, &pass).await? {
            Verdict::Denied => {
                debug!(user = %user, realm = %self.realm, "credentials rejected");
                return Ok(self.challenge());
            }
            Verdict::Granted => user,
            Verdict::GrantedAs(name) => name,
        };

        req.set_remote_user(identity);
        req.call(&self.app).await
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::core::HttpError;
    use crate::reqres::res;

    fn req(auth: Option<&str>) -> HttpRequest {
        let builder = HttpRequest::builder().path("/private");
        match auth {
            Some(auth) => builder.header("Authorization", auth),
            None => builder,
        }.build().unwrap()
    }

    fn basic(credentials: &str) -> String {
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// Echoes the identity and counts its invocations
    #[derive(Default)]
    struct Whoami(AtomicUsize);
    impl HttpService for Whoami {
        type Output = HttpResponse;
        async fn request(&self, req: &HttpRequest) -> HttpResult {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(res::text(req.remote_user().unwrap_or_default()))
        }
    }

    fn admin(user: &str, pass: &str) -> bool {
        user == "admin" && pass == "secret"
    }

    async fn body(res: HttpResponse) -> String {
        String::from_utf8(res.content.into_bytes().await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn challenge_without_header() {
        let auth = BasicAuth::new(Whoami::default(), admin);
        let res = req(None).call(&auth).await.unwrap();
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(res.header("WWW-Authenticate"), Some("Basic realm=\"Authorization Required\""));
        assert_eq!(res.content_type(), Some("text/plain"));
        assert_eq!(body(res).await, "Not Authorized");

        let auth = BasicAuth::new(Whoami::default(), admin).realm("Staff");
        let res = req(None).call(&auth).await.unwrap();
        assert_eq!(res.header("WWW-Authenticate"), Some("Basic realm=\"Staff\""));
    }

    #[tokio::test]
    async fn empty_header_is_challenged() {
        let auth = BasicAuth::new(Whoami::default(), admin);
        for header in ["", "   "] {
            let res = req(Some(header)).call(&auth).await.unwrap();
            assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{header:?}");
            assert_eq!(res.header("WWW-Authenticate"), Some("Basic realm=\"Authorization Required\""));
        }
        assert_eq!(auth.app.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn other_schemes_are_bad_requests() {
        let auth = BasicAuth::new(Whoami::default(), admin);
        for header in ["Bearer abc", "Digest username=\"admin\"", "Basic not*base64"] {
            let res = req(Some(header)).call(&auth).await.unwrap();
            assert_eq!(res.status, StatusCode::BAD_REQUEST, "{header}");
        }
        assert_eq!(auth.app.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn granted() {
        let auth = BasicAuth::new(Whoami::default(), admin);
        let request = req(Some(&basic("admin:secret")));
        let res = request.call(&auth).await.unwrap();
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(body(res).await, "admin");
        assert_eq!(request.remote_user().as_deref(), Some("admin"));

        // scheme is case-insensitive
        let res = req(Some(&basic("admin:secret").replace("Basic", "bAsIc")))
            .call(&auth).await.unwrap();
        assert_eq!(res.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn denied() {
        let auth = BasicAuth::new(Whoami::default(), admin);
        let request = req(Some(&basic("admin:wrong")));
        let res = request.call(&auth).await.unwrap();
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert!(res.header("WWW-Authenticate").is_some());
        assert_eq!(request.remote_user(), None);
        assert_eq!(auth.app.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn password_keeps_colons() {
        let auth = BasicAuth::new(Whoami::default(), |user: &str, pass: &str| user == "u" && pass == "a:b:c");
        let res = req(Some(&basic("u:a:b:c"))).call(&auth).await.unwrap();
        assert_eq!(res.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn canonical_identity() {
        let auth = BasicAuth::new(Whoami::default(), |user: &str, _pass: &str| {
            (user.eq_ignore_ascii_case("admin")).then(|| "administrator".to_string())
        });
        let res = req(Some(&basic("ADMIN:x"))).call(&auth).await.unwrap();
        assert_eq!(body(res).await, "administrator");

        let res = req(Some(&basic("guest:x"))).call(&auth).await.unwrap();
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let auth = BasicAuth::new(Whoami::default(), |_: &str, _: &str| "canonical_admin");
        let request = req(Some(&basic("whoever:x")));
        let res = request.call(&auth).await.unwrap();
        assert_eq!(body(res).await, "canonical_admin");
        assert_eq!(request.remote_user().as_deref(), Some("canonical_admin"));
    }

    struct SlowDenial;
    impl Validate for SlowDenial {
        async fn validate(&self, _user: &str, _pass: &str) -> HttpResult<Verdict> {
            tokio::task::yield_now().await;
            Ok("".into())
        }
    }

    struct SlowRefusal;
    impl Validate for SlowRefusal {
        async fn validate(&self, _user: &str, _pass: &str) -> HttpResult<Verdict> {
            tokio::task::yield_now().await;
            Ok(Verdict::from(false))
        }
    }

    struct Unreachable;
    impl Validate for Unreachable {
        async fn validate(&self, _user: &str, _pass: &str) -> HttpResult<Verdict> {
            Err(io::Error::other("directory is down").into())
        }
    }

    #[tokio::test]
    async fn async_validators() {
        let auth = BasicAuth::new(Whoami::default(), SlowDenial);
        let res = req(Some(&basic("admin:secret"))).call(&auth).await.unwrap();
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);

        let auth = BasicAuth::new(Whoami::default(), SlowRefusal);
        let res = req(Some(&basic("admin:secret"))).call(&auth).await.unwrap();
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert!(res.header("WWW-Authenticate").is_some());
        assert_eq!(auth.app.0.load(Ordering::SeqCst), 0);

        let auth = BasicAuth::new(Whoami::default(), Unreachable);
        let err = req(Some(&basic("admin:secret"))).call(&auth).await.unwrap_err();
        assert_eq!(err.to_string(), "directory is down");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn builder() {
        let err = BasicAuth::builder(Whoami::default()).realm("x").build().err();
        assert_eq!(err, Some(ConfigError::MissingValidator));

        let auth = BasicAuth::builder(Whoami::default()).validate(admin).realm("Built").build().unwrap();
        let res = req(None).call(&auth).await.unwrap();
        assert_eq!(res.header("WWW-Authenticate"), Some("Basic realm=\"Built\""));
    }

    #[test]
    fn verdicts() {
        assert_eq!(Verdict::from(true), Verdict::Granted);
        assert_eq!(Verdict::from(false), Verdict::Denied);
        assert_eq!(Verdict::from(""), Verdict::Denied);
        assert_eq!(Verdict::from(None), Verdict::Denied);
        assert_eq!(Verdict::from("root"), Verdict::GrantedAs("root".into()));
    }
}
