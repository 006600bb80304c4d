use anyhow::Result;
use rusqlite::Connection;
use std::env;
use std::path::PathBuf;

mod memberships;
mod relationships;
mod schema;
mod settings;

pub use schema::SCHEMA_VERSION;

/// Environment variable overriding the default database location.
pub const ENV_DB_PATH: &str = "MEMBERSHIP_ACL_DB";

/// Upper bound on bound parameters per batched `IN (...)` query.
pub const MAX_BIND_PARAMS: usize = 500;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database, creating if needed, running migrations
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_at(path)
    }

    pub fn open_at(path: PathBuf) -> Result<Self> {
        // Create parent directories
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open in-memory database for testing
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn default_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(ENV_DB_PATH) {
            return Ok(PathBuf::from(path));
        }
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("membershipacl").join("acl.db"))
    }

    fn migrate(&self) -> Result<()> {
        let mut version = self.get_schema_version()?;

        if version == 0 {
            // Run migration in a transaction for atomicity
            self.conn
                .execute_batch(&format!("BEGIN TRANSACTION; {} COMMIT;", schema::SCHEMA_V1))?;
            self.set_schema_version(1)?;
            version = 1;
        }

        if version == 1 {
            self.conn
                .execute_batch(&format!("BEGIN TRANSACTION; {} COMMIT;", schema::MIGRATION_V2))?;
            self.set_schema_version(2)?;
            version = 2;
        }

        tracing::debug!(version, "database schema ready");
        Ok(())
    }

    fn get_schema_version(&self) -> Result<i32> {
        let result: Result<i32, _> =
            self.conn
                .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                    row.get(0)
                });

        match result {
            Ok(v) => Ok(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(rusqlite::Error::SqliteFailure(err, msg)) => {
                // "no such table" is error code 1 (SQLITE_ERROR)
                if err.code == rusqlite::ErrorCode::Unknown
                    && msg.as_ref().map_or(false, |m| m.contains("no such table"))
                {
                    Ok(0)
                } else {
                    Err(rusqlite::Error::SqliteFailure(err, msg).into())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_schema_version(&self, version: i32) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?)",
            [version],
        )?;
        Ok(())
    }
}

/// `?, ?, ?` for an `IN (...)` list of `n` bound values.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
