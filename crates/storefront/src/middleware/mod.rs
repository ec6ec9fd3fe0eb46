//! Request middleware and extractors.

pub mod access;
pub mod session;

pub use access::RequireAccess;
