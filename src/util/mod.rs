//! Utility functions

pub(crate) mod escape;
pub(crate) mod future;
