//! Various useful HTTP services

mod defaultservice;
pub use defaultservice::DefaultService;

pub mod auth;
pub use auth::{BasicAuth, BasicAuthBuilder, Validate, Verdict};

mod log;
pub use log::{DefaultLogger, NoLogger};

mod errorpage;
pub use errorpage::ErrorPageHandler;
