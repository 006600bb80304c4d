use std::collections::{BTreeMap, BTreeSet};

use super::error::AclResult;
use super::store::MembershipStore;
use crate::models::{ContactId, MembershipId, MembershipTypeId};

/// Which organization owns each membership type.
pub struct MembershipTypeOwnershipIndex<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: MembershipStore + ?Sized> MembershipTypeOwnershipIndex<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Owner of every membership type, loaded in one query. Types without an
    /// owner are left out so they can never match an allowed contact.
    pub fn all_membership_types(&self) -> AclResult<BTreeMap<MembershipTypeId, ContactId>> {
        let owners = self
            .store
            .membership_type_owners()?
            .into_iter()
            .filter_map(|(type_id, owner)| owner.map(|owner| (type_id, owner)))
            .collect();
        Ok(owners)
    }

    pub fn owner_of(&self, membership_type_id: MembershipTypeId) -> AclResult<Option<ContactId>> {
        Ok(self.store.membership_type_owner(membership_type_id)?)
    }

    /// Membership type of each given membership. IDs that cannot name a
    /// record (zero or negative) are dropped; no query runs when nothing is
    /// left.
    pub fn type_ids_for_membership_ids<I>(&self, membership_ids: I) -> AclResult<BTreeMap<MembershipId, MembershipTypeId>>
    where
        I: IntoIterator<Item = MembershipId>,
    {
        let ids: BTreeSet<MembershipId> = membership_ids.into_iter().filter(|id| *id > 0).collect();
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let ids: Vec<MembershipId> = ids.into_iter().collect();
        Ok(self.store.membership_type_ids(&ids)?.into_iter().collect())
    }
}
