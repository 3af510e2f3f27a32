//! Credential to namespace resolution.

mod middleware;

pub use middleware::*;
