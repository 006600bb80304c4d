//! Keeps member -> owner relationships in step with saved memberships.

use super::error::{AclError, AclResult};
use super::ownership::MembershipTypeOwnershipIndex;
use super::store::{ConfigProvider, EdgeWrite, MembershipStore, RelationshipStore};
use crate::models::{ContactId, Membership, Relationship, RelationshipTypeId};

/// Config key holding the A-to-B name of the relationship type to create.
pub const CONFIG_RELATIONSHIP_TYPE_NAME: &str = "membershipRelationshipTypeAtoBName";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new member -> owner relationship was written.
    Created {
        owner_contact_id: ContactId,
        relationship_type_id: RelationshipTypeId,
    },
    /// A deactivated member -> owner relationship was switched back on.
    Reactivated {
        owner_contact_id: ContactId,
        relationship_type_id: RelationshipTypeId,
    },
    /// The exact edge was already present and active.
    AlreadyExists {
        owner_contact_id: ContactId,
        relationship_type_id: RelationshipTypeId,
    },
    /// The membership type has no owning organization.
    NoOwner,
    /// The member is the owning organization itself. Nothing is written
    /// since the host rejects a relationship from a contact to itself.
    SelfOwned,
}

pub struct MembershipRelationshipSynchronizer<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> MembershipRelationshipSynchronizer<'a, S>
where
    S: RelationshipStore + MembershipStore + ConfigProvider + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve the configured relationship type name to exactly one type.
    pub fn relationship_type_id(&self) -> AclResult<RelationshipTypeId> {
        let name = self
            .store
            .config_value(CONFIG_RELATIONSHIP_TYPE_NAME)?
            .ok_or_else(|| AclError::MissingConfig {
                key: CONFIG_RELATIONSHIP_TYPE_NAME.to_string(),
            })?;

        match self.store.relationship_type_ids_by_name(&name)?.as_slice() {
            [id] => Ok(*id),
            [] => Err(AclError::UnknownRelationshipType { name }),
            ids => Err(AclError::AmbiguousRelationshipType {
                name,
                count: ids.len(),
            }),
        }
    }

    /// Ensure the member has a relationship to the organization owning the
    /// membership type, granting the organization edit rights.
    pub fn sync_membership(&self, membership: &Membership) -> AclResult<SyncOutcome> {
        let relationship_type_id = self.relationship_type_id().map_err(|e| {
            tracing::warn!(error = %e, membership_id = membership.id, "membership relationship sync misconfigured");
            e
        })?;

        let owner = MembershipTypeOwnershipIndex::new(self.store).owner_of(membership.membership_type_id)?;
        let Some(owner_contact_id) = owner else {
            tracing::warn!(
                membership_id = membership.id,
                membership_type_id = membership.membership_type_id,
                "membership type has no owner organization, skipping relationship"
            );
            return Ok(SyncOutcome::NoOwner);
        };

        if owner_contact_id == membership.contact_id {
            return Ok(SyncOutcome::SelfOwned);
        }

        let link = Relationship::new_membership_link(membership.contact_id, owner_contact_id, relationship_type_id);
        let outcome = match self.store.ensure_relationship(&link)? {
            EdgeWrite::Inserted => SyncOutcome::Created {
                owner_contact_id,
                relationship_type_id,
            },
            EdgeWrite::Reactivated => SyncOutcome::Reactivated {
                owner_contact_id,
                relationship_type_id,
            },
            EdgeWrite::Unchanged => SyncOutcome::AlreadyExists {
                owner_contact_id,
                relationship_type_id,
            },
        };

        if !matches!(outcome, SyncOutcome::AlreadyExists { .. }) {
            tracing::info!(
                member = membership.contact_id,
                owner = owner_contact_id,
                relationship_type_id,
                ?outcome,
                "wrote membership relationship"
            );
        }
        Ok(outcome)
    }
}
