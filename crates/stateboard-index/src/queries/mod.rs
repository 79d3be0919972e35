pub mod lineage;
pub mod search;
pub mod state;
pub mod stats;
pub mod version;

/// Latest snapshot per live lineage (highest serial, then latest insert).
///
/// Prepended to queries that report on "current" infrastructure.
pub(crate) const LATEST_STATES_CTE: &str = r#"
    WITH latest AS (
        SELECT s.*
        FROM states s
        JOIN lineages l ON s.lineage_id = l.id
        WHERE l.deleted_at IS NULL
          AND s.id = (
              SELECT s2.id
              FROM states s2
              WHERE s2.lineage_id = s.lineage_id
              ORDER BY s2.serial DESC, s2.id DESC
              LIMIT 1
          )
    )
"#;

/// SQL row offset of a 1-based page, clamped to what SQLite accepts as an integer
pub(crate) fn page_offset(page: usize, page_size: usize) -> i64 {
    let offset = page.max(1).saturating_sub(1).saturating_mul(page_size);
    i64::try_from(offset).unwrap_or(i64::MAX)
}
