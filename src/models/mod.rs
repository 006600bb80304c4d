mod membership;
mod relationship;
mod row;

pub use membership::*;
pub use relationship::*;
pub use row::*;

pub type ContactId = i64;
pub type MembershipId = i64;
pub type MembershipTypeId = i64;
pub type RelationshipTypeId = i64;
