//! dstack: requests, the app calling protocol, params and Basic auth

pub mod reqres;
pub mod core;
pub mod params;
pub mod services;
pub mod prelude;
pub mod server;
pub(crate) mod util;
