//! Store construction and file-backed persistence.

mod persistence;
mod store;

pub use persistence::*;
pub use store::*;
