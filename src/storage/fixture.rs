//! JSON description of a small database: tables, indexes, rows and ghost
//! registrations.
//!
//! ```json
//! {
//!   "tables": [{
//!     "name": "invoices",
//!     "columns": [
//!       { "name": "number", "data_type": "integer" },
//!       { "name": "paid", "data_type": "boolean", "default": false }
//!     ],
//!     "indexes": [{ "name": "idx_number", "columns": ["number"] }],
//!     "ghosts": { "key": "number" },
//!     "rows": [{ "number": 1, "paid": true }]
//!   }]
//! }
//! ```

use super::{IndexDef, TableSchema};
use crate::core::{Column, FieldValues, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    pub tables: Vec<TableFixture>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFixture {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indexes: Vec<IndexDef>,
    #[serde(default)]
    pub ghosts: Option<GhostFixture>,
    #[serde(default)]
    pub rows: Vec<FieldValues>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GhostFixture {
    pub key: String,
    #[serde(default = "default_start")]
    pub start: i64,
}

fn default_start() -> i64 {
    1
}

impl Fixture {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl TableFixture {
    pub fn schema(&self) -> TableSchema {
        self.indexes.iter().cloned().fold(
            TableSchema::new(self.name.clone(), self.columns.clone()),
            TableSchema::with_index,
        )
    }
}
