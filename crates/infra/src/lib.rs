//! Infrastructure layer: membership storage and the lookup boundary the API
//! resolves roles through.

pub mod membership;

pub use membership::{
    InMemoryMembershipStore, MembershipLookup, MembershipStore, NewMembership, PostgresMembershipStore,
    StoreError,
};
