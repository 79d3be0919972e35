// SQLite state index
// Normalizes state snapshots into versions/lineages/states/modules/resources/instances/attributes

mod attributes;
mod db;
mod error;
mod ingest;
mod queries;
mod records;
mod schema;

// Public API
pub use attributes::flatten_attributes;
pub use db::Database;
pub use error::{Error, Result};
pub use queries::search::SEARCH_PAGE_SIZE;
pub use records::{
    AttributeValue, InstanceRecord, LineageActivity, LineageRecord, ModuleRecord, NameCount,
    ResourceRecord, SearchPage, SearchQuery, SearchResult, StateRecord, StateStat, StatsPage,
    VersionRecord,
};
pub use schema::SCHEMA_VERSION;
