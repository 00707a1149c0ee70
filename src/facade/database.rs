use crate::core::{DbError, FieldValues, Result};
use crate::ghosts::{GhostModel, GhostOptions, Ghosts};
use crate::query::{Query, Record};
use crate::storage::{Fixture, IndexDef, InMemoryStorage, StorageStats, TableSchema};
use std::collections::HashMap;
use std::path::Path;

/// In-memory database with per-table ghost registrations.
///
/// # Examples
///
/// ```
/// use rustmemodb_ghosts::{Column, DataType, GhostOptions, InMemoryDB, TableSchema, fields};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut db = InMemoryDB::new();
/// db.create_table(TableSchema::new("invoices", vec![
///     Column::new("number", DataType::Integer),
///     Column::new("paid", DataType::Boolean).default_value(false),
/// ]))?;
/// db.has_ghosts("invoices", "number", 1)?;
///
/// db.insert("invoices", fields([("number", 2)]))?;
///
/// let invoices = db.ghosts("invoices", &GhostOptions::new().range(1..=3))?.take(3)?;
/// let ghosts: Vec<bool> = invoices.iter().map(|i| i.is_ghost()).collect();
/// assert_eq!(ghosts, vec![true, false, true]);
/// # Ok(())
/// # }
/// ```
pub struct InMemoryDB {
    storage: InMemoryStorage,
    ghost_models: HashMap<String, GhostModel>,
}

impl InMemoryDB {
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
            ghost_models: HashMap::new(),
        }
    }

    /// Build a database from a fixture: tables first, then ghost
    /// registrations, then rows.
    pub fn from_fixture(fixture: Fixture) -> Result<Self> {
        let mut db = Self::new();
        for table in &fixture.tables {
            db.create_table(table.schema())?;
            if let Some(ghosts) = &table.ghosts {
                db.has_ghosts(&table.name, ghosts.key.clone(), ghosts.start)?;
            }
        }
        for table in fixture.tables {
            for row in table.rows {
                db.insert(&table.name, row)?;
            }
        }
        Ok(db)
    }

    pub fn load_fixture(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_fixture(Fixture::from_path(path)?)
    }

    pub fn storage(&self) -> &InMemoryStorage {
        &self.storage
    }

    pub fn create_table(&mut self, schema: TableSchema) -> Result<()> {
        self.storage.create_table(schema)
    }

    /// Drops the table and its ghost registration.
    pub fn drop_table(&mut self, table: &str) -> Result<()> {
        self.storage.drop_table(table)?;
        self.ghost_models.remove(table);
        Ok(())
    }

    /// Adds an index. A ghost registration on the table is re-checked so its
    /// index advisory stays current.
    pub fn create_index(&mut self, table: &str, index: IndexDef) -> Result<()> {
        self.storage.create_index(table, index)?;
        if let Some(model) = self.ghost_models.get(table) {
            let (key_field, start) = (model.key_field().to_string(), model.start());
            self.has_ghosts(table, key_field, start)?;
        }
        Ok(())
    }

    pub fn insert(&self, table: &str, fields: FieldValues) -> Result<Record> {
        self.storage.insert(table, fields)
    }

    pub fn find(&self, query: &Query) -> Result<Vec<Record>> {
        self.storage.find(query)
    }

    /// Enables ghosts on `table`, keyed by the integer column `key_field`,
    /// with unbounded sequences starting at `start`. Registering again
    /// replaces the previous registration.
    pub fn has_ghosts(&mut self, table: &str, key_field: impl Into<String>, start: i64) -> Result<&GhostModel> {
        let schema = self.storage.get_schema(table)?;
        let model = GhostModel::register(&schema, key_field, start)?;
        self.ghost_models.insert(table.to_string(), model);
        self.ghost_model(table)
    }

    pub fn ghost_model(&self, table: &str) -> Result<&GhostModel> {
        self.ghost_models
            .get(table)
            .ok_or_else(|| DbError::GhostsNotEnabled(table.to_string()))
    }

    /// Ghosts over every row of `table`.
    pub fn ghosts(&self, table: &str, options: &GhostOptions) -> Result<Ghosts<'_, InMemoryStorage>> {
        self.ghosts_in(&Query::all(table), options)
    }

    /// Ghosts over a filtered query; placeholders inherit its conditions.
    pub fn ghosts_in(&self, query: &Query, options: &GhostOptions) -> Result<Ghosts<'_, InMemoryStorage>> {
        let model = self.ghost_model(query.table())?;
        model.ghosts(&self.storage, query.clone(), options)
    }

    /// Ghosts over the `child_table` rows owned by `owner` through
    /// `foreign_key`.
    pub fn ghosts_for(
        &self,
        owner: &Record,
        child_table: &str,
        foreign_key: &str,
        options: &GhostOptions,
    ) -> Result<Ghosts<'_, InMemoryStorage>> {
        let query = Query::association(owner, child_table, foreign_key)?;
        self.ghosts_in(&query, options)
    }

    pub fn stats(&self) -> Result<StorageStats> {
        self.storage.stats()
    }
}

impl Default for InMemoryDB {
    fn default() -> Self {
        Self::new()
    }
}
