use serde::{Deserialize, Serialize};

use super::{ContactId, MembershipId, MembershipTypeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipType {
    pub id: Option<MembershipTypeId>,
    pub name: String,
    /// Owning organization. A type without an owner is visible to nobody.
    pub member_of_contact_id: Option<ContactId>,
}

impl MembershipType {
    pub fn new(name: impl Into<String>, member_of_contact_id: Option<ContactId>) -> Self {
        Self {
            id: None,
            name: name.into(),
            member_of_contact_id,
        }
    }
}

/// Persisted membership as handed over by the host after a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub contact_id: ContactId,
    pub membership_type_id: MembershipTypeId,
}

impl Membership {
    pub fn new(id: MembershipId, contact_id: ContactId, membership_type_id: MembershipTypeId) -> Self {
        Self {
            id,
            contact_id,
            membership_type_id,
        }
    }
}
