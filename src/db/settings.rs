//! Extension configuration rows and host user -> contact mapping.

use anyhow::Result;
use rusqlite::params;

use super::Database;
use crate::acl::store::{ConfigProvider, IdentityMap};
use crate::models::ContactId;

impl Database {
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT config_value FROM relationship_membership_acl_config WHERE config_key = ?",
            [key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_config_value(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO relationship_membership_acl_config (config_key, config_value)
             VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete_config_value(&self, key: &str) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM relationship_membership_acl_config WHERE config_key = ?",
            [key],
        )?;
        Ok(rows > 0)
    }

    // ==================== USER MATCHING ====================

    pub fn link_user_contact(&self, uf_id: i64, contact_id: ContactId) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO uf_match (uf_id, contact_id) VALUES (?, ?)",
            params![uf_id, contact_id],
        )?;
        Ok(())
    }

    pub fn get_contact_id_for_user(&self, uf_id: i64) -> Result<Option<ContactId>> {
        let result = self.conn.query_row(
            "SELECT contact_id FROM uf_match WHERE uf_id = ?",
            [uf_id],
            |row| row.get::<_, ContactId>(0),
        );

        match result {
            Ok(contact_id) => Ok(Some(contact_id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl ConfigProvider for Database {
    fn config_value(&self, key: &str) -> Result<Option<String>> {
        self.get_config_value(key)
    }
}

impl IdentityMap for Database {
    fn contact_id_for_user(&self, uf_id: i64) -> Result<Option<ContactId>> {
        self.get_contact_id_for_user(uf_id)
    }
}
