use super::{IndexDef, Table, TableSchema};
use crate::core::{DbError, FieldValues, Result, Row, RowId};
use crate::ghosts::{GhostSource, KeyFilter};
use crate::query::{Query, Record};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{Level, event};

pub struct InMemoryStorage {
    /// Per-table locks so rows can be inserted through `&self`.
    tables: HashMap<String, Arc<RwLock<Table>>>,
    range_fetches: AtomicUsize,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            range_fetches: AtomicUsize::new(0),
        }
    }

    pub fn create_table(&mut self, schema: TableSchema) -> Result<()> {
        let name = schema.name().to_string();

        if self.tables.contains_key(&name) {
            return Err(DbError::TableExists(name));
        }

        let table = Arc::new(RwLock::new(Table::new(schema)?));
        self.tables.insert(name, table);
        Ok(())
    }

    pub fn drop_table(&mut self, table_name: &str) -> Result<()> {
        if self.tables.remove(table_name).is_none() {
            return Err(DbError::TableNotFound(table_name.to_string()));
        }
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> Result<Arc<RwLock<Table>>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    pub fn insert(&self, table_name: &str, fields: FieldValues) -> Result<Record> {
        let table_handle = self.get_table(table_name)?;
        let mut table = table_handle.write()?;
        let id = table.insert(&fields)?;
        let row = table.get(id).cloned().unwrap_or_default();
        let fields = table.schema().schema().fields_from_row(&row);
        Ok(Record::stored(table_name, id, fields))
    }

    pub fn create_index(&self, table_name: &str, index: IndexDef) -> Result<()> {
        let table_handle = self.get_table(table_name)?;
        let mut table = table_handle.write()?;
        table.create_index(index)
    }

    pub fn get_schema(&self, table_name: &str) -> Result<TableSchema> {
        let table_handle = self.get_table(table_name)?;
        let table = table_handle.read()?;
        Ok(table.schema().clone())
    }

    pub fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn row_count(&self, table_name: &str) -> Result<usize> {
        let table_handle = self.get_table(table_name)?;
        let table = table_handle.read()?;
        Ok(table.row_count())
    }

    /// All records matching the query's equality conditions, in row id order.
    pub fn find(&self, query: &Query) -> Result<Vec<Record>> {
        let table_handle = self.get_table(query.table())?;
        let table = table_handle.read()?;
        let filter = table.resolve_filter(query.conditions())?;
        Ok(Self::to_records(&table, query.table(), table.scan(&filter)))
    }

    /// Records matching the query whose integer `column` lies in `keys`.
    ///
    /// Every call is counted in [`StorageStats::range_fetches`], including
    /// calls with an empty range.
    pub fn find_in_range(&self, query: &Query, column: &str, keys: RangeInclusive<i64>) -> Result<Vec<Record>> {
        self.range_fetches.fetch_add(1, Ordering::SeqCst);

        let table_handle = self.get_table(query.table())?;
        let table = table_handle.read()?;
        let filter = table.resolve_filter(query.conditions())?;
        let col_idx = table.column_index(column)?;

        event!(
            Level::DEBUG,
            table = query.table(),
            column,
            start = *keys.start(),
            end = *keys.end(),
            indexed = table.is_indexed(column),
            "range fetch"
        );

        let rows = table.scan_range(&filter, col_idx, keys);
        Ok(Self::to_records(&table, query.table(), rows))
    }

    pub fn stats(&self) -> Result<StorageStats> {
        let mut rows = 0;
        for handle in self.tables.values() {
            rows += handle.read()?.row_count();
        }

        Ok(StorageStats {
            tables: self.tables.len(),
            rows,
            range_fetches: self.range_fetches.load(Ordering::SeqCst),
        })
    }

    fn to_records(table: &Table, table_name: &str, rows: Vec<(RowId, Row)>) -> Vec<Record> {
        let schema = table.schema().schema();
        rows.into_iter()
            .map(|(id, row)| Record::stored(table_name, id, schema.fields_from_row(&row)))
            .collect()
    }
}

impl GhostSource for InMemoryStorage {
    type Query = Query;
    type Entity = Record;
    type Error = DbError;

    fn fetch_where(&self, query: &Query, field: &str, filter: KeyFilter) -> Result<Vec<Record>> {
        self.find_in_range(query, field, filter.as_range().keys())
    }

    fn extract_conditions(&self, query: &Query) -> FieldValues {
        query.conditions().clone()
    }

    /// Builds an unsaved record. Unknown fields and type mismatches fail;
    /// unset columns take their defaults; NOT NULL is only enforced on save.
    fn new_entity(&self, query: &Query, fields: FieldValues) -> Result<Record> {
        let table_handle = self.get_table(query.table())?;
        let table = table_handle.read()?;
        let schema = table.schema().schema();
        let row = schema.row_from_fields(query.table(), &fields)?;
        Ok(Record::transient(query.table(), schema.fields_from_row(&row)))
    }

    fn key_of(&self, entity: &Record, field: &str) -> Option<i64> {
        entity.get_i64(field)
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStats {
    pub tables: usize,
    pub rows: usize,
    pub range_fetches: usize,
}

impl std::fmt::Display for StorageStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Storage Stats: {} table(s), {} row(s), {} range fetch(es)",
            self.tables,
            self.rows,
            self.range_fetches
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType, fields};

    #[test]
    fn test_stats_report_poisoned_table() {
        let mut storage = InMemoryStorage::new();
        storage
            .create_table(TableSchema::new("levels", vec![Column::new("level", DataType::Integer)]))
            .unwrap();
        storage.insert("levels", fields([("level", 1)])).unwrap();
        assert_eq!(storage.stats().unwrap().rows, 1);

        let handle = storage.get_table("levels").unwrap();
        let _ = std::thread::spawn(move || {
            let _guard = handle.write().unwrap();
            panic!("poison the table lock");
        })
        .join();

        assert!(matches!(storage.stats(), Err(DbError::LockError(_))));
    }
}
