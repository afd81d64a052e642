//! Membership records: the (principal, role, scope) grants the resolver reads.

pub mod in_memory;
pub mod lookup;
pub mod postgres;
pub mod store;

pub use in_memory::InMemoryMembershipStore;
pub use lookup::MembershipLookup;
pub use postgres::PostgresMembershipStore;
pub use store::{MembershipStore, NewMembership, StoreError};
