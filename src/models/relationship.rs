use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ContactId, RelationshipTypeId};

/// Directed edge between two contacts.
///
/// `is_permission_a_b` lets contact A edit contact B; `is_permission_b_a`
/// lets B edit A.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: Option<i64>,
    pub contact_id_a: ContactId,
    pub contact_id_b: ContactId,
    pub relationship_type_id: RelationshipTypeId,
    pub is_active: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: String,
    pub is_permission_a_b: bool,
    pub is_permission_b_a: bool,
}

impl Relationship {
    pub fn new(
        contact_id_a: ContactId,
        contact_id_b: ContactId,
        relationship_type_id: RelationshipTypeId,
    ) -> Self {
        Self {
            id: None,
            contact_id_a,
            contact_id_b,
            relationship_type_id,
            is_active: true,
            start_date: None,
            end_date: None,
            description: String::new(),
            is_permission_a_b: false,
            is_permission_b_a: false,
        }
    }

    /// Edge from a member to the organization owning their membership type.
    /// The organization gets edit rights over the member, never the reverse.
    pub fn new_membership_link(
        member_contact_id: ContactId,
        owner_contact_id: ContactId,
        relationship_type_id: RelationshipTypeId,
    ) -> Self {
        Self {
            is_permission_b_a: true,
            ..Self::new(member_contact_id, owner_contact_id, relationship_type_id)
        }
    }

    /// True when the edge counts on `date`.
    pub fn is_current_on(&self, date: NaiveDate) -> bool {
        self.is_active
            && self.start_date.map_or(true, |start| start <= date)
            && self.end_date.map_or(true, |end| end >= date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipType {
    pub id: Option<RelationshipTypeId>,
    pub name_a_b: String,
    pub name_b_a: String,
    pub is_active: bool,
}

impl RelationshipType {
    pub fn new(name_a_b: impl Into<String>, name_b_a: impl Into<String>) -> Self {
        Self {
            id: None,
            name_a_b: name_a_b.into(),
            name_b_a: name_b_a.into(),
            is_active: true,
        }
    }
}
