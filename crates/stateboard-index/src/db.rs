use rusqlite::Connection;
use stateboard_types::{StateFile, Version};
use std::path::Path;

use crate::{
    Result, ingest,
    queries::{lineage, search, state, stats, version},
    records::{
        LineageActivity, LineageRecord, NameCount, SearchPage, SearchQuery, StateRecord,
        StatsPage, VersionRecord,
    },
    schema,
};

/// Relational index of Terraform state snapshots.
///
/// Each public write is a single transaction; reads are plain queries.
/// The index never retries and never logs: storage errors are returned as-is.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        let db = Self { conn };
        schema::init_schema(&db.conn)?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        schema::init_schema(&db.conn)?;
        Ok(db)
    }

    // --- Ingestion ---

    /// Register a backend version; repeated calls with the same id are no-ops.
    pub fn insert_version(&self, version: &Version) -> Result<i64> {
        ingest::insert_version(&self.conn, version)
    }

    /// Record a decoded snapshot of `path` at `version_id`.
    /// All rows are written atomically; returns the new state row id.
    pub fn insert_state(&self, path: &str, version_id: &str, file: &StateFile) -> Result<i64> {
        ingest::insert_state(&self.conn, path, version_id, file)
    }

    // --- Versions ---

    pub fn known_versions(&self) -> Result<Vec<String>> {
        version::known(&self.conn)
    }

    pub fn get_version(&self, version_id: &str) -> Result<Option<VersionRecord>> {
        version::get(&self.conn, version_id)
    }

    // --- States and lineages ---

    /// Snapshot tree for a lineage at a version, `None` if never ingested.
    pub fn get_state(&self, lineage: &str, version_id: &str) -> Result<Option<StateRecord>> {
        state::get(&self.conn, lineage, version_id)
    }

    pub fn get_lineage_activity(&self, lineage: &str) -> Result<Vec<LineageActivity>> {
        lineage::activity(&self.conn, lineage)
    }

    pub fn list_lineages(&self) -> Result<Vec<LineageRecord>> {
        lineage::list(&self.conn)
    }

    pub fn default_version(&self, lineage: &str) -> Result<Option<String>> {
        lineage::default_version(&self.conn, lineage)
    }

    pub fn tombstone_lineage(&self, lineage: &str) -> Result<bool> {
        lineage::tombstone(&self.conn, lineage)
    }

    pub fn purge_tombstoned(&self) -> Result<usize> {
        lineage::purge_tombstoned(&self.conn)
    }

    // --- Search and statistics ---

    pub fn search_attribute(&self, query: &SearchQuery) -> Result<SearchPage> {
        search::search(&self.conn, query)
    }

    pub fn list_state_stats(&self, page: usize) -> Result<StatsPage> {
        stats::state_stats(&self.conn, page)
    }

    pub fn list_resource_types(&self) -> Result<Vec<String>> {
        stats::resource_types(&self.conn)
    }

    pub fn list_resource_types_with_count(&self) -> Result<Vec<NameCount>> {
        stats::resource_types_with_count(&self.conn)
    }

    pub fn list_resource_names(&self) -> Result<Vec<String>> {
        stats::resource_names(&self.conn)
    }

    pub fn list_attribute_keys(&self, resource_type: Option<&str>) -> Result<Vec<String>> {
        stats::attribute_keys(&self.conn, resource_type)
    }

    pub fn list_tf_versions(&self) -> Result<Vec<String>> {
        stats::tf_versions(&self.conn)
    }

    pub fn list_tf_versions_with_count(&self) -> Result<Vec<NameCount>> {
        stats::tf_versions_with_count(&self.conn)
    }
}
