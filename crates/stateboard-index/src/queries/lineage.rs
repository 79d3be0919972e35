use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    Result,
    records::{LineageActivity, LineageRecord},
};

/// Every snapshot of a live lineage, oldest first.
pub fn activity(conn: &Connection, lineage: &str) -> Result<Vec<LineageActivity>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT s.path, v.version_id, s.serial, v.last_modified
        FROM states s
        JOIN lineages l ON s.lineage_id = l.id
        JOIN versions v ON s.version_id = v.id
        WHERE l.value = ?1 AND l.deleted_at IS NULL
        ORDER BY s.serial ASC, s.id ASC
        "#,
    )?;

    let entries = stmt
        .query_map([lineage], |row| {
            Ok(LineageActivity {
                path: row.get(0)?,
                version_id: row.get(1)?,
                serial: row.get(2)?,
                last_modified: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    Ok(entries)
}

pub fn list(conn: &Connection) -> Result<Vec<LineageRecord>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT l.value,
               COUNT(s.id),
               (SELECT s2.path FROM states s2 WHERE s2.lineage_id = l.id
                ORDER BY s2.serial DESC, s2.id DESC LIMIT 1),
               MAX(s.serial)
        FROM lineages l
        LEFT JOIN states s ON s.lineage_id = l.id
        WHERE l.deleted_at IS NULL
        GROUP BY l.id
        ORDER BY l.value
        "#,
    )?;

    let lineages = stmt
        .query_map([], |row| {
            Ok(LineageRecord {
                value: row.get(0)?,
                state_count: row.get::<_, i64>(1)? as usize,
                latest_path: row.get(2)?,
                latest_serial: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    Ok(lineages)
}

/// Version id of the latest snapshot of a live lineage.
pub fn default_version(conn: &Connection, lineage: &str) -> Result<Option<String>> {
    let result = conn
        .query_row(
            r#"
        SELECT v.version_id
        FROM states s
        JOIN lineages l ON s.lineage_id = l.id
        JOIN versions v ON s.version_id = v.id
        WHERE l.value = ?1 AND l.deleted_at IS NULL
        ORDER BY s.serial DESC, s.id DESC
        LIMIT 1
        "#,
            [lineage],
            |row| row.get(0),
        )
        .optional()?;

    Ok(result)
}

/// Soft-delete the live lineage with this value. Returns false if none was live.
pub fn tombstone(conn: &Connection, lineage: &str) -> Result<bool> {
    let updated = conn.execute(
        r#"
        UPDATE lineages
        SET deleted_at = ?2
        WHERE value = ?1 AND deleted_at IS NULL
        "#,
        params![lineage, Utc::now()],
    )?;

    Ok(updated > 0)
}

/// Hard-delete tombstoned lineages; states and their trees cascade.
pub fn purge_tombstoned(conn: &Connection) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM lineages WHERE deleted_at IS NOT NULL", [])?;
    Ok(deleted)
}
