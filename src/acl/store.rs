//! Data the permission core reads and writes.
//!
//! `Database` implements every trait here; hosts with their own storage can
//! implement them instead.

use anyhow::Result;

use crate::models::{ContactId, MembershipId, MembershipTypeId, Relationship, RelationshipTypeId};

pub trait RelationshipStore {
    /// Active edges of active relationship types that grant one of
    /// `contact_ids` edit permission over the other end: `contact_id_a` in the
    /// set with `is_permission_a_b`, or `contact_id_b` in the set with
    /// `is_permission_b_a`.
    fn permission_edges(&self, contact_ids: &[ContactId]) -> Result<Vec<Relationship>>;

    /// IDs of relationship types whose A-to-B name is exactly `name_a_b`.
    fn relationship_type_ids_by_name(&self, name_a_b: &str) -> Result<Vec<RelationshipTypeId>>;

    /// Make sure an active edge with the triple of `relationship` exists,
    /// atomically: insert it, or reactivate a deactivated one with the
    /// permission flags of `relationship`.
    fn ensure_relationship(&self, relationship: &Relationship) -> Result<EdgeWrite>;
}

/// What `RelationshipStore::ensure_relationship` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWrite {
    Inserted,
    Reactivated,
    /// An active edge was already there.
    Unchanged,
}

pub trait MembershipStore {
    /// Every membership type with its owner, in one query.
    fn membership_type_owners(&self) -> Result<Vec<(MembershipTypeId, Option<ContactId>)>>;

    /// Owner of one type; `None` for an unknown type or a type without owner.
    fn membership_type_owner(&self, membership_type_id: MembershipTypeId) -> Result<Option<ContactId>>;

    /// Type of each membership found among `membership_ids`.
    fn membership_type_ids(
        &self,
        membership_ids: &[MembershipId],
    ) -> Result<Vec<(MembershipId, MembershipTypeId)>>;
}

pub trait ConfigProvider {
    fn config_value(&self, key: &str) -> Result<Option<String>>;
}

pub trait IdentityMap {
    /// Contact linked to a host user account.
    fn contact_id_for_user(&self, uf_id: i64) -> Result<Option<ContactId>>;
}

/// Everything the host hooks need from one backing store.
pub trait AclStore: RelationshipStore + MembershipStore + ConfigProvider + IdentityMap {}

impl<T: ?Sized> AclStore for T where T: RelationshipStore + MembershipStore + ConfigProvider + IdentityMap {}
