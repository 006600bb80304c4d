use anyhow::Result;
use rusqlite::{params, params_from_iter};

use super::{placeholders, Database, MAX_BIND_PARAMS};
use crate::acl::store::MembershipStore;
use crate::models::*;

impl Database {
    // ==================== MEMBERSHIP TYPES ====================

    pub fn insert_membership_type(&self, membership_type: &MembershipType) -> Result<MembershipTypeId> {
        self.conn.execute(
            "INSERT INTO membership_type (name, member_of_contact_id) VALUES (?, ?)",
            params![membership_type.name, membership_type.member_of_contact_id],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every type with its owner in a single pass.
    pub fn list_membership_type_owners(&self) -> Result<Vec<(MembershipTypeId, Option<ContactId>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, member_of_contact_id FROM membership_type ORDER BY id")?;

        let owners = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(owners)
    }

    pub fn get_membership_type_owner(&self, membership_type_id: MembershipTypeId) -> Result<Option<ContactId>> {
        let result = self.conn.query_row(
            "SELECT member_of_contact_id FROM membership_type WHERE id = ?",
            [membership_type_id],
            |row| row.get::<_, Option<ContactId>>(0),
        );

        match result {
            Ok(owner) => Ok(owner),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_membership_type_owner(
        &self,
        membership_type_id: MembershipTypeId,
        owner: Option<ContactId>,
    ) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE membership_type SET member_of_contact_id = ? WHERE id = ?",
            params![owner, membership_type_id],
        )?;
        Ok(rows > 0)
    }

    // ==================== MEMBERSHIPS ====================

    pub fn insert_membership(&self, contact_id: ContactId, membership_type_id: MembershipTypeId) -> Result<Membership> {
        self.conn.execute(
            "INSERT INTO membership (contact_id, membership_type_id) VALUES (?, ?)",
            params![contact_id, membership_type_id],
        )?;
        Ok(Membership::new(
            self.conn.last_insert_rowid(),
            contact_id,
            membership_type_id,
        ))
    }

    /// Type of each membership found among `membership_ids`, fetched in
    /// chunks of `MAX_BIND_PARAMS`. Unknown IDs are simply absent.
    pub fn get_membership_type_ids(
        &self,
        membership_ids: &[MembershipId],
    ) -> Result<Vec<(MembershipId, MembershipTypeId)>> {
        let mut found = Vec::with_capacity(membership_ids.len());

        for chunk in membership_ids.chunks(MAX_BIND_PARAMS) {
            let sql = format!(
                "SELECT id, membership_type_id FROM membership WHERE id IN ({})",
                placeholders(chunk.len())
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let rows: Vec<(MembershipId, MembershipTypeId)> = stmt
                .query_map(params_from_iter(chunk.iter()), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            found.extend(rows);
        }

        Ok(found)
    }
}

impl MembershipStore for Database {
    fn membership_type_owners(&self) -> Result<Vec<(MembershipTypeId, Option<ContactId>)>> {
        self.list_membership_type_owners()
    }

    fn membership_type_owner(&self, membership_type_id: MembershipTypeId) -> Result<Option<ContactId>> {
        self.get_membership_type_owner(membership_type_id)
    }

    fn membership_type_ids(
        &self,
        membership_ids: &[MembershipId],
    ) -> Result<Vec<(MembershipId, MembershipTypeId)>> {
        self.get_membership_type_ids(membership_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_type_owners() {
        let db = Database::open_memory().unwrap();
        let gold = db.insert_membership_type(&MembershipType::new("Gold", Some(7))).unwrap();
        let orphan = db.insert_membership_type(&MembershipType::new("Orphan", None)).unwrap();

        let owners = db.list_membership_type_owners().unwrap();
        assert_eq!(owners, vec![(gold, Some(7)), (orphan, None)]);

        assert_eq!(db.get_membership_type_owner(gold).unwrap(), Some(7));
        assert_eq!(db.get_membership_type_owner(orphan).unwrap(), None);
        assert_eq!(db.get_membership_type_owner(404).unwrap(), None);
    }

    #[test]
    fn test_set_membership_type_owner() {
        let db = Database::open_memory().unwrap();
        let id = db.insert_membership_type(&MembershipType::new("Gold", None)).unwrap();
        assert!(db.set_membership_type_owner(id, Some(9)).unwrap());
        assert_eq!(db.get_membership_type_owner(id).unwrap(), Some(9));
    }

    #[test]
    fn test_membership_type_ids_batch() {
        let db = Database::open_memory().unwrap();
        let gold = db.insert_membership_type(&MembershipType::new("Gold", Some(7))).unwrap();
        let silver = db.insert_membership_type(&MembershipType::new("Silver", Some(9))).unwrap();

        let m1 = db.insert_membership(100, gold).unwrap();
        let m2 = db.insert_membership(101, silver).unwrap();

        let mut found = db.get_membership_type_ids(&[m2.id, 999, m1.id]).unwrap();
        found.sort();
        assert_eq!(found, vec![(m1.id, gold), (m2.id, silver)]);

        assert!(db.get_membership_type_ids(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_membership_type_ids_across_chunks() {
        let db = Database::open_memory().unwrap();
        let gold = db.insert_membership_type(&MembershipType::new("Gold", Some(7))).unwrap();

        let ids: Vec<MembershipId> = (0..(MAX_BIND_PARAMS + 5))
            .map(|i| db.insert_membership(i as ContactId + 1, gold).unwrap().id)
            .collect();

        let found = db.get_membership_type_ids(&ids).unwrap();
        assert_eq!(found.len(), ids.len());
    }
}
