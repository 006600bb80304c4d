pub mod acl;
pub mod db;
pub mod models;

pub use acl::{
    AclError, AclHooks, EventOutcome, HostEvent, MembershipAccessFilter,
    MembershipRelationshipSynchronizer, MembershipTypeOwnershipIndex, RelationshipGraphResolver,
    SyncOutcome,
};
pub use db::Database;
