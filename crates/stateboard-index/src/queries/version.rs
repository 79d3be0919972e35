use rusqlite::{Connection, OptionalExtension};

use crate::{Result, records::VersionRecord};

pub fn known(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT DISTINCT version_id
        FROM versions
        ORDER BY version_id
        "#,
    )?;

    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, rusqlite::Error>>()?;

    Ok(versions)
}

pub fn get(conn: &Connection, version_id: &str) -> Result<Option<VersionRecord>> {
    let result = conn
        .query_row(
            r#"
        SELECT id, version_id, last_modified
        FROM versions
        WHERE version_id = ?1
        "#,
            [version_id],
            |row| {
                Ok(VersionRecord {
                    id: row.get(0)?,
                    version_id: row.get(1)?,
                    last_modified: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(result)
}
