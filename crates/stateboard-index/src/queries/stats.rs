use rusqlite::{Connection, params};
use std::cmp::Ordering;

use super::{LATEST_STATES_CTE, page_offset, search::SEARCH_PAGE_SIZE};
use crate::{
    Result,
    records::{NameCount, StateStat, StatsPage},
};

/// One row per live lineage describing its latest snapshot, paginated.
pub fn state_stats(conn: &Connection, page: usize) -> Result<StatsPage> {
    let page = page.max(1);

    let total: i64 = conn.query_row(
        &format!("{} SELECT COUNT(*) FROM latest", LATEST_STATES_CTE),
        [],
        |row| row.get(0),
    )?;

    let sql = format!(
        r#"
        {}
        SELECT latest.path, l.value, v.version_id, v.last_modified,
               latest.terraform_version, latest.serial,
               (SELECT COUNT(*)
                FROM resources r
                JOIN modules m ON r.module_id = m.id
                WHERE m.state_id = latest.id)
        FROM latest
        JOIN lineages l ON latest.lineage_id = l.id
        JOIN versions v ON latest.version_id = v.id
        ORDER BY latest.path ASC, l.value ASC
        LIMIT ?1 OFFSET ?2
        "#,
        LATEST_STATES_CTE
    );

    let mut stmt = conn.prepare(&sql)?;
    let stats = stmt
        .query_map(
            params![SEARCH_PAGE_SIZE as i64, page_offset(page, SEARCH_PAGE_SIZE)],
            |row| {
                Ok(StateStat {
                    path: row.get(0)?,
                    lineage_value: row.get(1)?,
                    version_id: row.get(2)?,
                    last_modified: row.get(3)?,
                    tf_version: row.get(4)?,
                    serial: row.get(5)?,
                    resource_count: row.get::<_, i64>(6)? as usize,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    Ok(StatsPage {
        stats,
        page,
        total: total as usize,
    })
}

/// Resource types present in latest snapshots with their resource counts.
pub fn resource_types_with_count(conn: &Connection) -> Result<Vec<NameCount>> {
    let sql = format!(
        r#"
        {}
        SELECT r.type, COUNT(*)
        FROM latest
        JOIN modules m ON m.state_id = latest.id
        JOIN resources r ON r.module_id = m.id
        GROUP BY r.type
        ORDER BY r.type
        "#,
        LATEST_STATES_CTE
    );
    name_counts(conn, &sql)
}

pub fn resource_types(conn: &Connection) -> Result<Vec<String>> {
    Ok(resource_types_with_count(conn)?
        .into_iter()
        .map(|c| c.name)
        .collect())
}

pub fn resource_names(conn: &Connection) -> Result<Vec<String>> {
    let sql = format!(
        r#"
        {}
        SELECT DISTINCT r.name
        FROM latest
        JOIN modules m ON m.state_id = latest.id
        JOIN resources r ON r.module_id = m.id
        ORDER BY r.name
        "#,
        LATEST_STATES_CTE
    );

    let mut stmt = conn.prepare(&sql)?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, rusqlite::Error>>()?;
    Ok(names)
}

/// Attribute keys in latest snapshots, optionally restricted to one resource type.
pub fn attribute_keys(conn: &Connection, resource_type: Option<&str>) -> Result<Vec<String>> {
    let sql = format!(
        r#"
        {}
        SELECT DISTINCT a.key
        FROM latest
        JOIN modules m ON m.state_id = latest.id
        JOIN resources r ON r.module_id = m.id
        JOIN instances i ON i.resource_id = r.id
        JOIN attributes a ON a.instance_id = i.id
        WHERE ?1 IS NULL OR r.type = ?1
        ORDER BY a.key
        "#,
        LATEST_STATES_CTE
    );

    let mut stmt = conn.prepare(&sql)?;
    let keys = stmt
        .query_map([resource_type], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, rusqlite::Error>>()?;
    Ok(keys)
}

/// Terraform versions of latest snapshots with the number of lineages on each.
pub fn tf_versions_with_count(conn: &Connection) -> Result<Vec<NameCount>> {
    let sql = format!(
        r#"
        {}
        SELECT terraform_version, COUNT(*)
        FROM latest
        GROUP BY terraform_version
        ORDER BY COUNT(*) DESC, terraform_version ASC
        "#,
        LATEST_STATES_CTE
    );
    name_counts(conn, &sql)
}

/// Terraform versions of latest snapshots, oldest release first (`1.9.0` before `1.10.0`).
pub fn tf_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut versions: Vec<String> = tf_versions_with_count(conn)?
        .into_iter()
        .map(|c| c.name)
        .collect();
    versions.sort_by(|a, b| compare_versions(a, b));
    Ok(versions)
}

/// Compare dotted versions component by component, numerically.
/// A pre-release suffix (`1.6.0-beta1`) sorts before the plain release.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let key = |v: &str| -> Vec<(u64, bool, String)> {
        v.trim_start_matches('v')
            .split('.')
            .map(|part| {
                let rest = part.trim_start_matches(|c: char| c.is_ascii_digit());
                let digits = &part[..part.len() - rest.len()];
                (digits.parse::<u64>().unwrap_or(0), rest.is_empty(), rest.to_string())
            })
            .collect()
    };

    key(a).cmp(&key(b)).then_with(|| a.cmp(b))
}

fn name_counts(conn: &Connection, sql: &str) -> Result<Vec<NameCount>> {
    let mut stmt = conn.prepare(sql)?;
    let counts = stmt
        .query_map([], |row| {
            Ok(NameCount {
                name: row.get(0)?,
                count: row.get::<_, i64>(1)? as usize,
            })
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(counts)
}
