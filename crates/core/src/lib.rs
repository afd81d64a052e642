//! Identifiers and the domain error model shared by every crate.
//!
//! Nothing in here performs IO.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{MembershipId, ScopeId};
