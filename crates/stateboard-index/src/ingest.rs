use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use stateboard_types::{State, StateFile, Version};

use crate::{Error, Result, attributes::flatten_attributes};

/// Find-or-create a version row, returning its row id.
///
/// A `last_modified` learned later fills in a version first recorded without one.
pub fn insert_version(conn: &Connection, version: &Version) -> Result<i64> {
    find_or_create_version(conn, &version.id, version.last_modified)
}

/// Record one state snapshot in a single transaction, returning the new state row id.
///
/// Version and lineage rows are reused when they already exist; the state row
/// and its module tree are always new, so earlier snapshots of the same path
/// stay untouched.
pub fn insert_state(
    conn: &Connection,
    path: &str,
    version_id: &str,
    file: &StateFile,
) -> Result<i64> {
    let serial = i64::try_from(file.serial)
        .map_err(|_| Error::Query(format!("Serial {} out of range", file.serial)))?;

    // Rolled back on drop unless committed
    let tx = conn.unchecked_transaction()?;

    let version_row = find_or_create_version(&tx, version_id, None)?;
    let lineage_row = find_or_create_lineage(&tx, &file.lineage, version_row)?;

    let state_id = tx
        .prepare_cached(
            r#"
            INSERT INTO states (path, lineage_id, version_id, terraform_version, serial)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )?
        .insert(params![
            path,
            lineage_row,
            version_row,
            &file.terraform_version,
            serial
        ])?;

    insert_modules(&tx, state_id, &file.state)?;

    tx.commit()?;
    Ok(state_id)
}

fn find_or_create_version(
    conn: &Connection,
    version_id: &str,
    last_modified: Option<DateTime<Utc>>,
) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO versions (version_id, last_modified)
        VALUES (?1, ?2)
        ON CONFLICT(version_id) DO UPDATE SET
            last_modified = COALESCE(versions.last_modified, excluded.last_modified)
        "#,
        params![version_id, last_modified],
    )?;

    let id = conn.query_row(
        "SELECT id FROM versions WHERE version_id = ?1",
        [version_id],
        |row| row.get(0),
    )?;

    Ok(id)
}

fn find_or_create_lineage(conn: &Connection, value: &str, version_row: i64) -> Result<i64> {
    // Uniqueness is enforced by the partial index on live lineages
    conn.execute(
        r#"
        INSERT INTO lineages (value, version_id)
        VALUES (?1, ?2)
        ON CONFLICT DO NOTHING
        "#,
        params![value, version_row],
    )?;

    let id = conn.query_row(
        "SELECT id FROM lineages WHERE value = ?1 AND deleted_at IS NULL",
        [value],
        |row| row.get(0),
    )?;

    Ok(id)
}

fn insert_modules(conn: &Connection, state_id: i64, state: &State) -> Result<()> {
    let mut module_stmt =
        conn.prepare_cached("INSERT INTO modules (state_id, path) VALUES (?1, ?2)")?;
    let mut resource_stmt = conn.prepare_cached(
        "INSERT INTO resources (module_id, type, name, mode) VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut instance_stmt =
        conn.prepare_cached("INSERT INTO instances (resource_id, index_key) VALUES (?1, ?2)")?;
    let mut attribute_stmt = conn
        .prepare_cached("INSERT INTO attributes (instance_id, key, value) VALUES (?1, ?2, ?3)")?;

    for module in &state.modules {
        let module_id = module_stmt.insert(params![state_id, &module.addr])?;

        for resource in &module.resources {
            let resource_id = resource_stmt.insert(params![
                module_id,
                &resource.resource_type,
                &resource.name,
                resource.mode.as_str()
            ])?;

            for instance in &resource.instances {
                let instance_id =
                    instance_stmt.insert(params![resource_id, instance.index_key.render()])?;

                for attribute in flatten_attributes(instance.current.as_ref())? {
                    attribute_stmt.execute(params![instance_id, attribute.key, attribute.value])?;
                }
            }
        }
    }

    Ok(())
}
