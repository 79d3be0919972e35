use rusqlite::Connection;

use crate::Result;

// Schema version (increment when changing table definitions)
pub const SCHEMA_VERSION: i32 = 3;

// NOTE: Table layout
//
// versions/lineages are find-or-create identities shared by many states.
// states and everything below them are write-once: a re-ingested path gets a
// new states row, so full history is kept.
//
// Lineage uniqueness only covers live rows (deleted_at IS NULL). A tombstoned
// lineage keeps its history until purged; purging cascades through
// states -> modules -> resources -> instances -> attributes.

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != SCHEMA_VERSION {
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS versions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            version_id TEXT NOT NULL UNIQUE,
            last_modified TEXT
        );

        CREATE TABLE IF NOT EXISTS lineages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            value TEXT NOT NULL,
            deleted_at TEXT,
            version_id INTEGER REFERENCES versions(id)
        );

        CREATE TABLE IF NOT EXISTS states (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL,
            lineage_id INTEGER NOT NULL REFERENCES lineages(id) ON DELETE CASCADE,
            version_id INTEGER NOT NULL REFERENCES versions(id),
            terraform_version TEXT NOT NULL,
            serial INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS modules (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            state_id INTEGER NOT NULL REFERENCES states(id) ON DELETE CASCADE,
            path TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS resources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            module_id INTEGER NOT NULL REFERENCES modules(id) ON DELETE CASCADE,
            type TEXT NOT NULL,
            name TEXT NOT NULL,
            mode TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS instances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            resource_id INTEGER NOT NULL REFERENCES resources(id) ON DELETE CASCADE,
            index_key TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS attributes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            instance_id INTEGER NOT NULL REFERENCES instances(id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE (instance_id, key)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_lineages_live_value
            ON lineages(value) WHERE deleted_at IS NULL;
        CREATE INDEX IF NOT EXISTS idx_states_lineage ON states(lineage_id, serial);
        CREATE INDEX IF NOT EXISTS idx_states_version ON states(version_id);
        CREATE INDEX IF NOT EXISTS idx_states_path ON states(path);
        CREATE INDEX IF NOT EXISTS idx_modules_state ON modules(state_id);
        CREATE INDEX IF NOT EXISTS idx_resources_module ON resources(module_id);
        CREATE INDEX IF NOT EXISTS idx_resources_type_name ON resources(type, name);
        CREATE INDEX IF NOT EXISTS idx_instances_resource ON instances(resource_id);
        CREATE INDEX IF NOT EXISTS idx_attributes_key ON attributes(key);
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS attributes;
        DROP TABLE IF EXISTS instances;
        DROP TABLE IF EXISTS resources;
        DROP TABLE IF EXISTS modules;
        DROP TABLE IF EXISTS states;
        DROP TABLE IF EXISTS lineages;
        DROP TABLE IF EXISTS versions;
        "#,
    )?;
    Ok(())
}
