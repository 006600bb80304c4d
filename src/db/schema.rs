pub const SCHEMA_VERSION: i32 = 2;

/// V2 migration: one edge per (member, owner, type) triple so concurrent
/// membership saves cannot both insert.
pub const MIGRATION_V2: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_relationship_triple
    ON relationship(contact_id_a, contact_id_b, relationship_type_id);
"#;

pub const SCHEMA_V1: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS relationship_type (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name_a_b TEXT NOT NULL,
    name_b_a TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS relationship (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id_a INTEGER NOT NULL,
    contact_id_b INTEGER NOT NULL,
    relationship_type_id INTEGER NOT NULL,
    start_date TEXT,
    end_date TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    description TEXT NOT NULL DEFAULT '',
    is_permission_a_b INTEGER NOT NULL DEFAULT 0,
    is_permission_b_a INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (relationship_type_id) REFERENCES relationship_type(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS membership_type (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    member_of_contact_id INTEGER
);

CREATE TABLE IF NOT EXISTS membership (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    contact_id INTEGER NOT NULL,
    membership_type_id INTEGER NOT NULL,
    FOREIGN KEY (membership_type_id) REFERENCES membership_type(id)
);

-- Host user account -> contact mapping
CREATE TABLE IF NOT EXISTS uf_match (
    uf_id INTEGER PRIMARY KEY,
    contact_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS relationship_membership_acl_config (
    config_key TEXT PRIMARY KEY,
    config_value TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_relationship_a ON relationship(contact_id_a, is_permission_a_b);
CREATE INDEX IF NOT EXISTS idx_relationship_b ON relationship(contact_id_b, is_permission_b_a);
CREATE INDEX IF NOT EXISTS idx_relationship_type_name ON relationship_type(name_a_b);
CREATE INDEX IF NOT EXISTS idx_membership_type ON membership(membership_type_id);
"#;
