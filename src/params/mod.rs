//! Params: query string merged with parsed request content
//!
//! Content keys take precedence over query keys of the same name. The merge happens once
//! per request, later calls get the cached result and never touch the content stream again

use std::io;
use std::fmt;
use std::error::Error;

use tracing::debug;

use crate::core::HttpError;
use crate::reqres::HttpRequest;

pub mod query;
pub mod filter;
mod content;
pub use content::{ContentParser, FormParser};
mod multipart;

pub use filter::Filters;

/// Merged request parameters
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Request content could not be turned into params
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    /// Content is longer than allowed
    TooLarge { limit: u64 },
    /// Content stream failed
    Io { kind: io::ErrorKind, message: String },
    /// Content does not match its declared type
    Malformed(String),
}

impl fmt::Display for ContentError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ContentError::TooLarge { limit } => write!(fmt, "content is longer than {limit} bytes"),
            ContentError::Io { message, .. } => fmt.write_str(message),
            ContentError::Malformed(why) => write!(fmt, "malformed content: {why}"),
        }
    }
}

impl Error for ContentError {}
impl HttpError for ContentError {}

impl HttpRequest {
    /// Query merged with content parsed by [`FormParser`]
    ///
    /// See [`get_params_with`](HttpRequest::get_params_with)
    pub async fn get_params(&self, max_content_length: u64, upload_prefix: &str) -> Result<&Params, ContentError> {
        self.get_params_with(&FormParser, max_content_length, upload_prefix).await
    }

    /// Query merged with content parsed by `parser`
    ///
    /// Only the first call parses anything, its arguments win. Every later call returns the
    /// same params (or the same error)
    pub async fn get_params_with<P: ContentParser>(&self, parser: &P, max_content_length: u64, upload_prefix: &str) -> Result<&Params, ContentError> {
        let result = self.params.get_or_init(|| async {
            let mut params = self.query().clone();
            if let Some(content) = self.take_content() {
                let parsed = parser.parse(self, content, max_content_length, upload_prefix).await?;
                debug!(query = params.len(), content = parsed.len(), "merged params");
                params.extend(parsed);
            }
            Ok::<Params, ContentError>(params)
        }).await;
        result.as_ref().map_err(Clone::clone)
    }

    /// Whitelisted params, see [`Filters`]
    pub async fn filter_params(&self, filters: &Filters, max_content_length: u64, upload_prefix: &str) -> Result<Params, ContentError> {
        let params = self.get_params(max_content_length, upload_prefix).await?;
        Ok(filters.apply(params))
    }
}
