// ============================================================================
// RustMemDB Ghosts Library
// ============================================================================
//
// Range queries over an integer key that return a record for every key in
// the range. Keys with no stored row come back as "ghosts": unsaved records
// pre-filled with the query's conditions.

pub mod core;
pub mod facade;
pub mod ghosts;
pub mod query;
pub mod storage;

// Re-export main types for convenience
pub use crate::core::{Column, DataType, DbError, FieldValues, Result, RowId, Value, fields};
pub use facade::InMemoryDB;
pub use ghosts::{
    GhostModel, GhostOptions, GhostSequence, GhostSource, Ghosts, KeyFilter, KeyRange,
    Materialized, materialize_from, materialize_range,
};
pub use query::{Query, Record};
pub use storage::{IndexDef, InMemoryStorage, StorageStats, TableSchema};
