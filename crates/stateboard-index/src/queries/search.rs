use rusqlite::{Connection, ToSql};

use super::page_offset;
use crate::{
    Result,
    records::{SearchPage, SearchQuery, SearchResult},
};

/// Results per search page
pub const SEARCH_PAGE_SIZE: usize = 20;

const SEARCH_FROM: &str = r#"
    FROM attributes a
    JOIN instances i ON a.instance_id = i.id
    JOIN resources r ON i.resource_id = r.id
    JOIN modules m ON r.module_id = m.id
    JOIN states s ON m.state_id = s.id
    JOIN lineages l ON s.lineage_id = l.id
    JOIN versions v ON s.version_id = v.id
"#;

const SEARCH_ORDER: &str = r#"
    ORDER BY s.path ASC, s.serial DESC, m.path ASC, r.type ASC, r.name ASC,
             i.index_key ASC, a.key ASC, a.id ASC
"#;

/// Run an attribute search; the total is counted with the same predicate as the page.
pub fn search(conn: &Connection, query: &SearchQuery) -> Result<SearchPage> {
    let page = query.page_number();
    let limit = SEARCH_PAGE_SIZE as i64;
    let offset = page_offset(page, SEARCH_PAGE_SIZE);

    let (where_clause, params) = build_filter(query);
    let mut param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let count_sql = format!("SELECT COUNT(*) {} WHERE {}", SEARCH_FROM, where_clause);
    let total: i64 = conn.query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))?;

    // LIMIT/OFFSET follow the filter placeholders
    param_refs.push(&limit);
    param_refs.push(&offset);

    let page_sql = format!(
        r#"
        SELECT s.path, v.version_id, s.terraform_version, s.serial, l.value,
               m.path, r.type, r.name, i.index_key, a.key, a.value
        {}
        WHERE {}
        {}
        LIMIT ? OFFSET ?
        "#,
        SEARCH_FROM, where_clause, SEARCH_ORDER
    );

    let mut stmt = conn.prepare(&page_sql)?;
    let results = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(SearchResult {
                path: row.get(0)?,
                version_id: row.get(1)?,
                tf_version: row.get(2)?,
                serial: row.get(3)?,
                lineage_value: row.get(4)?,
                module_path: row.get(5)?,
                resource_type: row.get(6)?,
                resource_name: row.get(7)?,
                resource_index: row.get(8)?,
                attribute_key: row.get(9)?,
                attribute_value: row.get(10)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

    Ok(SearchPage {
        results,
        page,
        total: total as usize,
    })
}

fn build_filter(query: &SearchQuery) -> (String, Vec<Box<dyn ToSql>>) {
    let mut where_clauses = vec!["l.deleted_at IS NULL"];
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    let filters = [
        ("r.type = ?", &query.resource_type),
        ("r.name = ?", &query.resource_name),
        ("a.key = ?", &query.attribute_key),
        ("a.value = ?", &query.attribute_value),
        ("s.terraform_version = ?", &query.tf_version),
        ("v.version_id = ?", &query.version_id),
        ("l.value = ?", &query.lineage),
    ];

    for (clause, value) in filters {
        if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
            where_clauses.push(clause);
            params.push(Box::new(value.clone()));
        }
    }

    (where_clauses.join(" AND "), params)
}
