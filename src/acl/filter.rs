//! Membership visibility and edit checks.
//!
//! A user sees a membership only when its type is owned by an organization
//! inside the user's edit-permission closure. Everything is recomputed per
//! call so relationship changes apply immediately.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use super::error::{AclError, AclResult};
use super::ownership::MembershipTypeOwnershipIndex;
use super::resolver::RelationshipGraphResolver;
use super::store::{MembershipStore, RelationshipStore};
use crate::models::{ActiveMembership, ContactId, MembershipId, MembershipRow, MembershipTypeId};

pub struct MembershipAccessFilter<'a, S: ?Sized> {
    store: &'a S,
    as_of: Option<NaiveDate>,
}

impl<'a, S> MembershipAccessFilter<'a, S>
where
    S: RelationshipStore + MembershipStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store, as_of: None }
    }

    /// Evaluate relationship dates against `date` instead of today.
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    fn resolver(&self) -> RelationshipGraphResolver<'a, S> {
        let resolver = RelationshipGraphResolver::new(self.store);
        match self.as_of {
            Some(date) => resolver.as_of(date),
            None => resolver,
        }
    }

    /// Membership types owned by an organization the user may edit.
    pub fn allowed_membership_type_ids(&self, user_contact_id: ContactId) -> AclResult<BTreeSet<MembershipTypeId>> {
        let allowed_contacts = self.resolver().contact_ids_with_edit_permissions(user_contact_id)?;
        if allowed_contacts.is_empty() {
            return Ok(BTreeSet::new());
        }

        let owners = MembershipTypeOwnershipIndex::new(self.store).all_membership_types()?;
        let allowed = owners
            .into_iter()
            .filter(|(_, owner)| allowed_contacts.contains(owner))
            .map(|(type_id, _)| type_id)
            .collect();
        Ok(allowed)
    }

    /// Subset of `membership_ids` the user may see, in input order.
    pub fn allowed_membership_ids(
        &self,
        membership_ids: &[MembershipId],
        user_contact_id: ContactId,
    ) -> AclResult<Vec<MembershipId>> {
        let allowed_types = self.allowed_membership_type_ids(user_contact_id)?;
        if allowed_types.is_empty() {
            return Ok(Vec::new());
        }

        let type_of = MembershipTypeOwnershipIndex::new(self.store)
            .type_ids_for_membership_ids(membership_ids.iter().copied())?;

        Ok(membership_ids
            .iter()
            .copied()
            .filter(|id| type_of.get(id).map_or(false, |t| allowed_types.contains(t)))
            .collect())
    }

    /// Drop search/dashboard rows for memberships the user may not see.
    ///
    /// `None` means no search has run yet and is passed through untouched.
    pub fn filter_memberships(
        &self,
        rows: Option<Vec<MembershipRow>>,
        user_contact_id: ContactId,
    ) -> AclResult<Option<Vec<MembershipRow>>> {
        let Some(rows) = rows else {
            return Ok(None);
        };

        let ids: Vec<MembershipId> = rows.iter().map(MembershipRow::membership_id).collect();
        let allowed: BTreeSet<MembershipId> =
            self.allowed_membership_ids(&ids, user_contact_id)?.into_iter().collect();

        let total = rows.len();
        let kept: Vec<MembershipRow> = rows
            .into_iter()
            .filter(|row| allowed.contains(&row.membership_id()))
            .collect();

        tracing::debug!(user_contact_id, total, kept = kept.len(), "filtered membership rows");
        Ok(Some(kept))
    }

    /// Drop contact-tab entries whose membership type the user may not see.
    pub fn filter_active_memberships(
        &self,
        memberships: Option<BTreeMap<MembershipId, ActiveMembership>>,
        user_contact_id: ContactId,
    ) -> AclResult<Option<BTreeMap<MembershipId, ActiveMembership>>> {
        let Some(memberships) = memberships else {
            return Ok(None);
        };

        let allowed_types = self.allowed_membership_type_ids(user_contact_id)?;
        let total = memberships.len();
        let kept: BTreeMap<MembershipId, ActiveMembership> = memberships
            .into_iter()
            .filter(|(_, m)| m.membership_type_id().map_or(false, |t| allowed_types.contains(&t)))
            .collect();

        tracing::debug!(user_contact_id, total, kept = kept.len(), "filtered active memberships");
        Ok(Some(kept))
    }

    /// Fails with `AclError::AccessDenied` unless the user may edit the
    /// membership. Unknown memberships are denied.
    pub fn check_edit_permission(&self, membership_id: MembershipId, user_contact_id: ContactId) -> AclResult<()> {
        if self.allowed_membership_ids(&[membership_id], user_contact_id)?.is_empty() {
            tracing::warn!(membership_id, user_contact_id, "membership edit denied");
            return Err(AclError::AccessDenied { membership_id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{MembershipType, Relationship, RelationshipType};
    use serde_json::json;

    const USER: ContactId = 1;
    const ORG7: ContactId = 7;
    const ORG9: ContactId = 9;

    struct Fixture {
        db: Database,
        type_org7: MembershipTypeId,
        type_org9: MembershipTypeId,
        type_orphan: MembershipTypeId,
    }

    /// User 1 may edit org 7 only.
    fn fixture() -> Fixture {
        let db = Database::open_memory().unwrap();
        let rel_type = db
            .insert_relationship_type(&RelationshipType::new("Employee of", "Employer of"))
            .unwrap();
        let mut rel = Relationship::new(USER, ORG7, rel_type);
        rel.is_permission_a_b = true;
        db.insert_relationship(&rel).unwrap();

        let type_org7 = db.insert_membership_type(&MembershipType::new("Org7", Some(ORG7))).unwrap();
        let type_org9 = db.insert_membership_type(&MembershipType::new("Org9", Some(ORG9))).unwrap();
        let type_orphan = db.insert_membership_type(&MembershipType::new("Orphan", None)).unwrap();

        Fixture {
            db,
            type_org7,
            type_org9,
            type_orphan,
        }
    }

    #[test]
    fn test_allowed_membership_type_ids() {
        let f = fixture();
        let filter = MembershipAccessFilter::new(&f.db);

        let allowed = filter.allowed_membership_type_ids(USER).unwrap();
        assert_eq!(allowed, BTreeSet::from([f.type_org7]));
        assert!(!allowed.contains(&f.type_org9));
        assert!(!allowed.contains(&f.type_orphan));

        // Contact without relationships sees nothing
        assert!(filter.allowed_membership_type_ids(500).unwrap().is_empty());
    }

    #[test]
    fn test_filter_memberships_preserves_order() {
        let f = fixture();
        let a = f.db.insert_membership(100, f.type_org7).unwrap();
        let b = f.db.insert_membership(101, f.type_org9).unwrap();
        let c = f.db.insert_membership(102, f.type_org7).unwrap();

        let rows = vec![
            MembershipRow::new(c.id).with_field("sort_name", "C"),
            MembershipRow::new(b.id.to_string()),
            MembershipRow::new("garbage"),
            MembershipRow::new(json!(null)),
            MembershipRow::new(a.id.to_string()).with_field("sort_name", "A"),
        ];

        let filter = MembershipAccessFilter::new(&f.db);
        let kept = filter.filter_memberships(Some(rows), USER).unwrap().unwrap();
        let ids: Vec<_> = kept.iter().map(MembershipRow::membership_id).collect();
        assert_eq!(ids, vec![c.id, a.id]);
        assert_eq!(kept[0].fields.get("sort_name"), Some(&json!("C")));
    }

    #[test]
    fn test_filter_memberships_passes_none_through() {
        let f = fixture();
        let filter = MembershipAccessFilter::new(&f.db);
        assert_eq!(filter.filter_memberships(None, USER).unwrap(), None);
    }

    #[test]
    fn test_filter_memberships_empty_rows() {
        let f = fixture();
        let filter = MembershipAccessFilter::new(&f.db);
        assert_eq!(filter.filter_memberships(Some(Vec::new()), USER).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_filter_active_memberships_keeps_keys() {
        let f = fixture();
        let memberships = BTreeMap::from([
            (31, ActiveMembership::new(f.type_org7).with_field("status", "Current")),
            (32, ActiveMembership::new(f.type_org9)),
            (33, ActiveMembership::new(f.type_orphan)),
            (34, ActiveMembership::new(f.type_org7.to_string())),
            (35, ActiveMembership::default()),
        ]);

        let filter = MembershipAccessFilter::new(&f.db);
        let kept = filter
            .filter_active_memberships(Some(memberships), USER)
            .unwrap()
            .unwrap();
        assert_eq!(kept.keys().copied().collect::<Vec<_>>(), vec![31, 34]);
        assert_eq!(kept[&31].fields.get("status"), Some(&json!("Current")));

        assert_eq!(filter.filter_active_memberships(None, USER).unwrap(), None);
    }

    #[test]
    fn test_check_edit_permission() {
        let f = fixture();
        let own = f.db.insert_membership(100, f.type_org7).unwrap();
        let other = f.db.insert_membership(101, f.type_org9).unwrap();
        let orphan = f.db.insert_membership(102, f.type_orphan).unwrap();

        let filter = MembershipAccessFilter::new(&f.db);
        assert!(filter.check_edit_permission(own.id, USER).is_ok());

        let err = filter.check_edit_permission(other.id, USER).unwrap_err();
        assert!(matches!(err, AclError::AccessDenied { membership_id } if membership_id == other.id));
        assert!(filter.check_edit_permission(orphan.id, USER).unwrap_err().is_denial());
        assert!(filter.check_edit_permission(9999, USER).unwrap_err().is_denial());
    }

    #[test]
    fn test_as_of_applies_to_closure() {
        let f = fixture();
        let rel_type = f.db.find_relationship_type_ids("Employee of").unwrap()[0];
        let mut temp = Relationship::new(USER, ORG9, rel_type);
        temp.is_permission_a_b = true;
        temp.end_date = NaiveDate::from_ymd_opt(2020, 12, 31);
        f.db.insert_relationship(&temp).unwrap();

        let in_2020 = MembershipAccessFilter::new(&f.db).as_of(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert_eq!(
            in_2020.allowed_membership_type_ids(USER).unwrap(),
            BTreeSet::from([f.type_org7, f.type_org9])
        );

        let in_2021 = MembershipAccessFilter::new(&f.db).as_of(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(
            in_2021.allowed_membership_type_ids(USER).unwrap(),
            BTreeSet::from([f.type_org7])
        );
    }
}
