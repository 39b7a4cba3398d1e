use std::fmt;
use std::error::Error;

use crate::core::{HttpError, HttpErrorType};

/// An HTTP status code
///
/// Any value in `100..=599` is accepted, only the codes produced by this crate have
/// a named constant and a reason phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    /// Malformed `Authorization` header
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// Basic auth challenge
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// Every application error unless it says otherwise
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Reason phrase, `"Unknown"` for codes without a constant
    /// ```
    /// # use dstack::reqres::StatusCode;
    /// assert_eq!(StatusCode::UNAUTHORIZED.as_str(), "Unauthorized");
    /// assert_eq!(StatusCode(299).as_str(), "Unknown");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match *self {
            StatusCode::OK => "OK",
            StatusCode::CREATED => "Created",
            StatusCode::NO_CONTENT => "No content",
            StatusCode::BAD_REQUEST => "Bad request",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::NOT_FOUND => "Not found",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error",
            _ => "Unknown",
        }
    }

    /// Checks that this code is in `100..=599`
    pub fn is_valid(&self) -> bool {
        (100..=599).contains(&self.0)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(fmt)
    }
}

impl Error for StatusCode {}

/// Returning a bare code from an app renders its plain error page
impl HttpError for StatusCode {
    fn error_type(&self) -> HttpErrorType {
        HttpErrorType::Hidden
    }

    fn status_code(&self) -> StatusCode {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        assert!(StatusCode(100).is_valid());
        assert!(StatusCode(599).is_valid());
        assert!(!StatusCode(99).is_valid());
        assert!(!StatusCode(600).is_valid());
    }

    #[test]
    fn codes_are_hidden_errors() {
        let err = StatusCode(410);
        assert_eq!(err.error_type(), HttpErrorType::Hidden);
        assert_eq!(err.status_code(), StatusCode(410));
        assert_eq!(err.to_string(), "410");
    }
}
