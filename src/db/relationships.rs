use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};

use super::{placeholders, Database, MAX_BIND_PARAMS};
use crate::acl::store::{EdgeWrite, RelationshipStore};
use crate::models::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn parse_date(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
}

impl Database {
    // ==================== RELATIONSHIP TYPES ====================

    pub fn insert_relationship_type(&self, rel_type: &RelationshipType) -> Result<RelationshipTypeId> {
        self.conn.execute(
            "INSERT INTO relationship_type (name_a_b, name_b_a, is_active) VALUES (?, ?, ?)",
            params![rel_type.name_a_b, rel_type.name_b_a, rel_type.is_active as i32],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn find_relationship_type_ids(&self, name_a_b: &str) -> Result<Vec<RelationshipTypeId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM relationship_type WHERE name_a_b = ? ORDER BY id")?;

        let ids = stmt
            .query_map([name_a_b], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(ids)
    }

    // ==================== RELATIONSHIPS ====================

    pub fn insert_relationship(&self, rel: &Relationship) -> Result<i64> {
        Self::insert_relationship_row(&self.conn, rel, false)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Edges granting any of `contact_ids` edit permission, batched so each
    /// statement binds at most `MAX_BIND_PARAMS` values.
    pub fn get_permission_edges(&self, contact_ids: &[ContactId]) -> Result<Vec<Relationship>> {
        let mut edges = Vec::new();

        // Each chunk is bound twice, once per direction.
        for chunk in contact_ids.chunks(MAX_BIND_PARAMS / 2) {
            let list = placeholders(chunk.len());
            let sql = format!(
                r#"SELECT r.id, r.contact_id_a, r.contact_id_b, r.relationship_type_id,
                          r.start_date, r.end_date, r.is_active, r.description,
                          r.is_permission_a_b, r.is_permission_b_a
                   FROM relationship r
                   INNER JOIN relationship_type t ON t.id = r.relationship_type_id
                   WHERE r.is_active = 1 AND t.is_active = 1
                     AND ((r.contact_id_a IN ({list}) AND r.is_permission_a_b = 1)
                       OR (r.contact_id_b IN ({list}) AND r.is_permission_b_a = 1))
                   ORDER BY r.id"#
            );

            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt
                .query_map(
                    params_from_iter(chunk.iter().chain(chunk.iter())),
                    Self::row_to_relationship,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            edges.extend(rows);
        }

        Ok(edges)
    }

    pub fn find_relationship(
        &self,
        contact_id_a: ContactId,
        contact_id_b: ContactId,
        relationship_type_id: RelationshipTypeId,
    ) -> Result<Option<Relationship>> {
        let result = self.conn.query_row(
            r#"SELECT id, contact_id_a, contact_id_b, relationship_type_id,
                      start_date, end_date, is_active, description,
                      is_permission_a_b, is_permission_b_a
               FROM relationship
               WHERE contact_id_a = ? AND contact_id_b = ? AND relationship_type_id = ?"#,
            params![contact_id_a, contact_id_b, relationship_type_id],
            Self::row_to_relationship,
        );

        match result {
            Ok(rel) => Ok(Some(rel)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn count_relationships(
        &self,
        contact_id_a: ContactId,
        contact_id_b: ContactId,
        relationship_type_id: RelationshipTypeId,
    ) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            Self::count_sql(),
            params![contact_id_a, contact_id_b, relationship_type_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Exact match on (contact_id_a, contact_id_b, relationship_type_id),
    /// active or not.
    pub fn relationship_exists(
        &self,
        contact_id_a: ContactId,
        contact_id_b: ContactId,
        relationship_type_id: RelationshipTypeId,
    ) -> Result<bool> {
        Ok(self.count_relationships(contact_id_a, contact_id_b, relationship_type_id)? > 0)
    }

    /// Make sure an active edge with the triple of `rel` exists. Lookup and
    /// write share one immediate transaction; a deactivated edge is switched
    /// back on with the permission flags of `rel`.
    pub fn upsert_relationship(&self, rel: &Relationship) -> Result<EdgeWrite> {
        let tx = rusqlite::Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let existing = tx.query_row(
            r#"SELECT id, is_active FROM relationship
               WHERE contact_id_a = ? AND contact_id_b = ? AND relationship_type_id = ?"#,
            params![rel.contact_id_a, rel.contact_id_b, rel.relationship_type_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i32>(1)? != 0)),
        );

        let write = match existing {
            Ok((_, true)) => EdgeWrite::Unchanged,
            Ok((id, false)) => {
                tx.execute(
                    r#"UPDATE relationship
                       SET is_active = 1, is_permission_a_b = ?, is_permission_b_a = ?
                       WHERE id = ?"#,
                    params![rel.is_permission_a_b as i32, rel.is_permission_b_a as i32, id],
                )?;
                EdgeWrite::Reactivated
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                // The unique triple index turns a lost race into a no-op.
                if Self::insert_relationship_row(&tx, rel, true)? > 0 {
                    EdgeWrite::Inserted
                } else {
                    EdgeWrite::Unchanged
                }
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit()?;
        Ok(write)
    }

    pub fn deactivate_relationship(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("UPDATE relationship SET is_active = 0 WHERE id = ?", [id])?;
        Ok(rows > 0)
    }

    fn count_sql() -> &'static str {
        r#"SELECT COUNT(*) FROM relationship
           WHERE contact_id_a = ? AND contact_id_b = ? AND relationship_type_id = ?"#
    }

    fn insert_relationship_row(conn: &Connection, rel: &Relationship, ignore_conflict: bool) -> Result<usize> {
        let verb = if ignore_conflict { "INSERT OR IGNORE" } else { "INSERT" };
        let rows = conn.execute(
            &format!(
                r#"{verb} INTO relationship (
                    contact_id_a, contact_id_b, relationship_type_id, start_date, end_date,
                    is_active, description, is_permission_a_b, is_permission_b_a
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#
            ),
            params![
                rel.contact_id_a,
                rel.contact_id_b,
                rel.relationship_type_id,
                format_date(rel.start_date),
                format_date(rel.end_date),
                rel.is_active as i32,
                rel.description,
                rel.is_permission_a_b as i32,
                rel.is_permission_b_a as i32,
            ],
        )?;
        Ok(rows)
    }

    fn row_to_relationship(row: &Row) -> rusqlite::Result<Relationship> {
        Ok(Relationship {
            id: row.get(0)?,
            contact_id_a: row.get(1)?,
            contact_id_b: row.get(2)?,
            relationship_type_id: row.get(3)?,
            start_date: parse_date(row.get(4)?),
            end_date: parse_date(row.get(5)?),
            is_active: row.get::<_, i32>(6)? != 0,
            description: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            is_permission_a_b: row.get::<_, i32>(8)? != 0,
            is_permission_b_a: row.get::<_, i32>(9)? != 0,
        })
    }
}

impl RelationshipStore for Database {
    fn permission_edges(&self, contact_ids: &[ContactId]) -> Result<Vec<Relationship>> {
        self.get_permission_edges(contact_ids)
    }

    fn relationship_type_ids_by_name(&self, name_a_b: &str) -> Result<Vec<RelationshipTypeId>> {
        self.find_relationship_type_ids(name_a_b)
    }

    fn ensure_relationship(&self, relationship: &Relationship) -> Result<EdgeWrite> {
        self.upsert_relationship(relationship)
    }
}
