//! PCN Identity Layer
//!
//! The registry is the source of truth for which users exist. Users are
//! registered once, never modified, and never removed.

pub mod error;
pub mod registry;

pub use error::IdentityError;
pub use registry::{UserRecord, UserRegistry};
