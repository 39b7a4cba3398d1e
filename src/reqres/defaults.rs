use std::fmt;
use std::sync::{Arc, LazyLock};

use tracing::error;

/// Receives diagnostics about a failed exchange
pub type ErrorHook = Arc<dyn Fn(&str) + Send + Sync>;
/// Notified when the transport connection of a request has closed
pub type CloseHook = Arc<dyn Fn() + Send + Sync>;

/// Hooks used by requests that were built without their own
///
/// Create one at startup and hand it to every
/// [`HttpRequestBuilder::defaults`](crate::reqres::HttpRequestBuilder::defaults).
/// Builders that never receive one use [`RequestDefaults::platform`]
#[derive(Clone, Default)]
pub struct RequestDefaults {
    pub on_error: Option<ErrorHook>,
    pub on_close: Option<CloseHook>,
}

static PLATFORM: LazyLock<RequestDefaults> = LazyLock::new(|| RequestDefaults {
    on_error: Some(Arc::new(|message: &str| error!(target: "dstack", "{message}"))),
    on_close: Some(Arc::new(|| {})),
});

impl RequestDefaults {
    /// No hooks at all, requests must bring their own
    pub fn none() -> RequestDefaults {
        RequestDefaults::default()
    }

    /// Errors go to the `tracing` error stream, closes are ignored
    pub fn platform() -> &'static RequestDefaults {
        &PLATFORM
    }

    pub fn on_error(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> RequestDefaults {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn on_close(mut self, hook: impl Fn() + Send + Sync + 'static) -> RequestDefaults {
        self.on_close = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for RequestDefaults {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("RequestDefaults")
            .field("on_error", &self.on_error.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
