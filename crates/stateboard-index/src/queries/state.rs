use rusqlite::{Connection, OptionalExtension};
use stateboard_types::ResourceMode;
use std::collections::HashMap;

use crate::{
    Error, Result,
    records::{AttributeValue, InstanceRecord, ModuleRecord, ResourceRecord, StateRecord},
};

/// Load the most recently ingested snapshot of `lineage` at `version_id`,
/// with its full module/resource/instance/attribute tree.
pub fn get(conn: &Connection, lineage: &str, version_id: &str) -> Result<Option<StateRecord>> {
    let state = conn
        .query_row(
            r#"
        SELECT s.id, s.path, l.value, v.version_id, v.last_modified, s.terraform_version, s.serial
        FROM states s
        JOIN lineages l ON s.lineage_id = l.id
        JOIN versions v ON s.version_id = v.id
        WHERE l.value = ?1 AND v.version_id = ?2 AND l.deleted_at IS NULL
        ORDER BY s.id DESC
        LIMIT 1
        "#,
            [lineage, version_id],
            |row| {
                Ok(StateRecord {
                    id: row.get(0)?,
                    path: row.get(1)?,
                    lineage: row.get(2)?,
                    version_id: row.get(3)?,
                    last_modified: row.get(4)?,
                    terraform_version: row.get(5)?,
                    serial: row.get(6)?,
                    modules: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut state) = state else {
        return Ok(None);
    };

    state.modules = load_tree(conn, state.id)?;
    Ok(Some(state))
}

// One query per level, stitched together by parent id
fn load_tree(conn: &Connection, state_id: i64) -> Result<Vec<ModuleRecord>> {
    let mut attributes = load_attributes(conn, state_id)?;
    let mut instances = load_instances(conn, state_id, &mut attributes)?;
    let mut resources = load_resources(conn, state_id, &mut instances)?;

    let mut stmt = conn.prepare(
        r#"
        SELECT id, path
        FROM modules
        WHERE state_id = ?1
        ORDER BY id
        "#,
    )?;

    let modules = stmt
        .query_map([state_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?
        .into_iter()
        .map(|(id, path)| ModuleRecord {
            id,
            path,
            resources: resources.remove(&id).unwrap_or_default(),
        })
        .collect();

    Ok(modules)
}

fn load_resources(
    conn: &Connection,
    state_id: i64,
    instances: &mut HashMap<i64, Vec<InstanceRecord>>,
) -> Result<HashMap<i64, Vec<ResourceRecord>>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT r.id, r.module_id, r.type, r.name, r.mode
        FROM resources r
        JOIN modules m ON r.module_id = m.id
        WHERE m.state_id = ?1
        ORDER BY r.id
        "#,
    )?;

    let rows = stmt
        .query_map([state_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    let mut by_module: HashMap<i64, Vec<ResourceRecord>> = HashMap::new();
    for (id, module_id, resource_type, name, mode) in rows {
        let mode = ResourceMode::parse(&mode)
            .ok_or_else(|| Error::Query(format!("Unknown resource mode '{}'", mode)))?;

        by_module.entry(module_id).or_default().push(ResourceRecord {
            id,
            resource_type,
            name,
            mode,
            instances: instances.remove(&id).unwrap_or_default(),
        });
    }

    Ok(by_module)
}

fn load_instances(
    conn: &Connection,
    state_id: i64,
    attributes: &mut HashMap<i64, Vec<AttributeValue>>,
) -> Result<HashMap<i64, Vec<InstanceRecord>>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT i.id, i.resource_id, i.index_key
        FROM instances i
        JOIN resources r ON i.resource_id = r.id
        JOIN modules m ON r.module_id = m.id
        WHERE m.state_id = ?1
        ORDER BY i.id
        "#,
    )?;

    let rows = stmt
        .query_map([state_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    let mut by_resource: HashMap<i64, Vec<InstanceRecord>> = HashMap::new();
    for (id, resource_id, index_key) in rows {
        by_resource.entry(resource_id).or_default().push(InstanceRecord {
            id,
            index_key,
            attributes: attributes.remove(&id).unwrap_or_default(),
        });
    }

    Ok(by_resource)
}

fn load_attributes(conn: &Connection, state_id: i64) -> Result<HashMap<i64, Vec<AttributeValue>>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT a.instance_id, a.key, a.value
        FROM attributes a
        JOIN instances i ON a.instance_id = i.id
        JOIN resources r ON i.resource_id = r.id
        JOIN modules m ON r.module_id = m.id
        WHERE m.state_id = ?1
        ORDER BY a.key
        "#,
    )?;

    let rows = stmt
        .query_map([state_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                AttributeValue {
                    key: row.get(1)?,
                    value: row.get(2)?,
                },
            ))
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    let mut by_instance: HashMap<i64, Vec<AttributeValue>> = HashMap::new();
    for (instance_id, attribute) in rows {
        by_instance.entry(instance_id).or_default().push(attribute);
    }

    Ok(by_instance)
}
