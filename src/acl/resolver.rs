//! Edit-permission closure over the relationship graph.

use chrono::{Local, NaiveDate};
use std::collections::BTreeSet;

use super::error::AclResult;
use super::store::RelationshipStore;
use crate::models::{ContactId, Relationship};

/// Walks permission-granting relationships outward from a contact.
///
/// An edge lets `contact_id_a` edit `contact_id_b` when `is_permission_a_b`
/// is set and the reverse when `is_permission_b_a` is set. Edges only count
/// while active and current on the evaluation date.
pub struct RelationshipGraphResolver<'a, S: ?Sized> {
    store: &'a S,
    as_of: NaiveDate,
}

impl<'a, S: RelationshipStore + ?Sized> RelationshipGraphResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            as_of: Local::now().date_naive(),
        }
    }

    /// Evaluate relationship start/end dates against `date` instead of today.
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = date;
        self
    }

    /// All contacts `contact_id` may edit, directly or through contacts it
    /// may edit. One store query per level of the graph.
    pub fn contact_ids_with_edit_permissions(&self, contact_id: ContactId) -> AclResult<BTreeSet<ContactId>> {
        let mut reached = BTreeSet::new();
        let mut visited = BTreeSet::from([contact_id]);
        let mut frontier = BTreeSet::from([contact_id]);
        let mut depth = 0usize;

        while !frontier.is_empty() {
            let ids: Vec<ContactId> = frontier.iter().copied().collect();
            let edges = self.store.permission_edges(&ids)?;

            let mut next = BTreeSet::new();
            for edge in edges.iter().filter(|e| e.is_current_on(self.as_of)) {
                for target in granted_targets(edge, &frontier) {
                    reached.insert(target);
                    if visited.insert(target) {
                        next.insert(target);
                    }
                }
            }

            frontier = next;
            depth += 1;
        }

        tracing::debug!(contact_id, depth, reached = reached.len(), "resolved edit-permission closure");
        Ok(reached)
    }
}

/// Contacts that a frontier member gains edit rights over through `edge`.
fn granted_targets(edge: &Relationship, frontier: &BTreeSet<ContactId>) -> Vec<ContactId> {
    let mut targets = Vec::with_capacity(2);
    if edge.is_permission_a_b && frontier.contains(&edge.contact_id_a) {
        targets.push(edge.contact_id_b);
    }
    if edge.is_permission_b_a && frontier.contains(&edge.contact_id_b) {
        targets.push(edge.contact_id_a);
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{RelationshipType, RelationshipTypeId};

    fn setup() -> (Database, RelationshipTypeId) {
        let db = Database::open_memory().unwrap();
        let type_id = db
            .insert_relationship_type(&RelationshipType::new("Employee of", "Employer of"))
            .unwrap();
        (db, type_id)
    }

    fn grant(db: &Database, type_id: RelationshipTypeId, editor: ContactId, edited: ContactId) {
        let mut rel = Relationship::new(editor, edited, type_id);
        rel.is_permission_a_b = true;
        db.insert_relationship(&rel).unwrap();
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_closure() {
        let (db, _) = setup();
        let resolver = RelationshipGraphResolver::new(&db);
        assert!(resolver.contact_ids_with_edit_permissions(1).unwrap().is_empty());
    }

    #[test]
    fn test_transitive_closure() {
        let (db, type_id) = setup();
        grant(&db, type_id, 1, 7);
        grant(&db, type_id, 7, 20);
        grant(&db, type_id, 20, 21);
        grant(&db, type_id, 99, 1);

        let resolver = RelationshipGraphResolver::new(&db);
        let closure = resolver.contact_ids_with_edit_permissions(1).unwrap();
        assert_eq!(closure, BTreeSet::from([7, 20, 21]));
    }

    #[test]
    fn test_b_to_a_permission() {
        let (db, type_id) = setup();
        // Member 10 -> org 7, org may edit member
        let rel = Relationship::new_membership_link(10, 7, type_id);
        db.insert_relationship(&rel).unwrap();

        let resolver = RelationshipGraphResolver::new(&db);
        assert_eq!(
            resolver.contact_ids_with_edit_permissions(7).unwrap(),
            BTreeSet::from([10])
        );
        assert!(resolver.contact_ids_with_edit_permissions(10).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let (db, type_id) = setup();
        grant(&db, type_id, 1, 2);
        grant(&db, type_id, 2, 3);
        grant(&db, type_id, 3, 1);

        let resolver = RelationshipGraphResolver::new(&db);
        assert_eq!(
            resolver.contact_ids_with_edit_permissions(1).unwrap(),
            BTreeSet::from([1, 2, 3])
        );
    }

    #[test]
    fn test_dates_bound_edges() {
        let (db, type_id) = setup();
        let mut rel = Relationship::new(1, 7, type_id);
        rel.is_permission_a_b = true;
        rel.start_date = Some(day(2024, 1, 1));
        rel.end_date = Some(day(2024, 12, 31));
        db.insert_relationship(&rel).unwrap();

        let before = RelationshipGraphResolver::new(&db).as_of(day(2023, 12, 31));
        assert!(before.contact_ids_with_edit_permissions(1).unwrap().is_empty());

        let during = RelationshipGraphResolver::new(&db).as_of(day(2024, 6, 1));
        assert_eq!(
            during.contact_ids_with_edit_permissions(1).unwrap(),
            BTreeSet::from([7])
        );

        let after = RelationshipGraphResolver::new(&db).as_of(day(2025, 1, 1));
        assert!(after.contact_ids_with_edit_permissions(1).unwrap().is_empty());
    }

    #[test]
    fn test_inactive_edge_breaks_chain() {
        let (db, type_id) = setup();
        grant(&db, type_id, 1, 7);
        let mut rel = Relationship::new(7, 20, type_id);
        rel.is_permission_a_b = true;
        rel.is_active = false;
        db.insert_relationship(&rel).unwrap();

        let resolver = RelationshipGraphResolver::new(&db);
        assert_eq!(
            resolver.contact_ids_with_edit_permissions(1).unwrap(),
            BTreeSet::from([7])
        );
    }

    #[test]
    fn test_granted_targets_ignores_non_frontier_end() {
        let mut edge = Relationship::new(1, 2, 1);
        edge.is_permission_a_b = true;
        edge.is_permission_b_a = true;
        assert_eq!(granted_targets(&edge, &BTreeSet::from([1])), vec![2]);
        assert_eq!(granted_targets(&edge, &BTreeSet::from([2])), vec![1]);
        assert!(granted_targets(&edge, &BTreeSet::from([3])).is_empty());
    }
}
