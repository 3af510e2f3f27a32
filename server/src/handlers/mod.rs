//! Request handlers for record operations.

pub(crate) mod objects;

pub use objects::*;
