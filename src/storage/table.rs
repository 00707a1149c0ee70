use crate::core::{Column, DbError, FieldValues, Result, Row, RowId, Schema, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::RangeInclusive;

/// Resolved equality filter: column position and required value.
pub type RowFilter = Vec<(usize, Value)>;

#[derive(Debug, Clone)]
pub struct Table {
    schema: TableSchema,
    rows: BTreeMap<RowId, Row>,
    next_row_id: RowId,
    /// Keyed by the leading column of each index definition.
    indexes: HashMap<String, BTreeMap<Value, Vec<RowId>>>,
}

impl Table {
    /// Builds an empty table and materializes the schema's indexes. An index
    /// naming an unknown column, or no column at all, is an error.
    pub fn new(schema: TableSchema) -> Result<Self> {
        let mut table = Self {
            schema: TableSchema {
                indexes: Vec::new(),
                ..schema.clone()
            },
            rows: BTreeMap::new(),
            next_row_id: 1,
            indexes: HashMap::new(),
        };
        for index in schema.indexes {
            table.create_index(index)?;
        }
        Ok(table)
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn insert(&mut self, fields: &FieldValues) -> Result<RowId> {
        let row = self.schema.schema().row_from_fields(self.schema.name(), fields)?;
        self.validate_row(&row)?;

        let id = self.next_row_id;
        self.next_row_id += 1;

        self.update_indexes(id, &row);
        self.rows.insert(id, row);
        Ok(id)
    }

    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Maps named equality conditions onto column positions.
    pub fn resolve_filter(&self, conditions: &FieldValues) -> Result<RowFilter> {
        conditions
            .iter()
            .map(|(name, value)| {
                self.column_index(name).map(|idx| (idx, value.clone()))
            })
            .collect()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.schema
            .schema()
            .find_column_index(name)
            .ok_or_else(|| DbError::ColumnNotFound(name.to_string(), self.schema.name.clone()))
    }

    /// All rows matching `filter`, in row id order.
    pub fn scan(&self, filter: &RowFilter) -> Vec<(RowId, Row)> {
        self.rows
            .iter()
            .filter(|(_, row)| Self::matches(row, filter))
            .map(|(id, row)| (*id, row.clone()))
            .collect()
    }

    /// Rows matching `filter` whose integer `column` lies in `keys`.
    ///
    /// Uses the index led by `column` when there is one; otherwise falls back
    /// to a full scan. Both paths return the same rows.
    pub fn scan_range(&self, filter: &RowFilter, column: usize, keys: RangeInclusive<i64>) -> Vec<(RowId, Row)> {
        if keys.is_empty() {
            return Vec::new();
        }

        let column_name = &self.schema.schema().columns()[column].name;
        if let Some(index) = self.indexes.get(column_name) {
            let bounds = Value::Integer(*keys.start())..=Value::Integer(*keys.end());
            return index
                .range(bounds)
                .flat_map(|(_, ids)| ids.iter())
                .filter_map(|id| self.rows.get(id).map(|row| (*id, row)))
                .filter(|(_, row)| Self::matches(row, filter))
                .map(|(id, row)| (id, row.clone()))
                .collect();
        }

        self.rows
            .iter()
            .filter(|(_, row)| row[column].as_i64().is_some_and(|key| keys.contains(&key)))
            .filter(|(_, row)| Self::matches(row, filter))
            .map(|(id, row)| (*id, row.clone()))
            .collect()
    }

    pub fn create_index(&mut self, index: IndexDef) -> Result<()> {
        if self.schema.indexes.iter().any(|existing| existing.name == index.name) {
            return Ok(());
        }
        let Some(leading) = index.leading_column() else {
            return Err(DbError::InvalidArgument(format!(
                "Index '{}' has no columns",
                index.name
            )));
        };
        for column in &index.columns {
            self.column_index(column)?;
        }

        let col_idx = self.column_index(leading)?;
        if !self.indexes.contains_key(leading) {
            let mut map: BTreeMap<Value, Vec<RowId>> = BTreeMap::new();
            for (id, row) in &self.rows {
                map.entry(row[col_idx].clone()).or_default().push(*id);
            }
            self.indexes.insert(leading.to_string(), map);
        }
        self.schema.indexes.push(index);
        Ok(())
    }

    pub fn is_indexed(&self, column: &str) -> bool {
        self.indexes.contains_key(column)
    }

    fn matches(row: &Row, filter: &RowFilter) -> bool {
        filter.iter().all(|(idx, value)| &row[*idx] == value)
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        for (column, value) in self.schema.schema().columns().iter().zip(row.iter()) {
            column.validate(value)?;
        }
        Ok(())
    }

    fn update_indexes(&mut self, id: RowId, row: &Row) {
        for (col_name, index) in &mut self.indexes {
            if let Some(col_idx) = self.schema.schema.find_column_index(col_name) {
                index.entry(row[col_idx].clone()).or_default().push(id);
            }
        }
    }
}

/// Index definition. Only the leading column is materialized for lookups;
/// the remaining columns are kept for introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexDef {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn leading_column(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    schema: Schema,
    #[serde(default)]
    indexes: Vec<IndexDef>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            schema: Schema::new(columns),
            indexes: Vec::new(),
        }
    }

    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }

    /// True when some index has `column` as its leading column.
    pub fn has_leading_index(&self, column: &str) -> bool {
        self.indexes
            .iter()
            .any(|idx| idx.leading_column() == Some(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DataType;

    fn numbers(indexed: bool) -> Table {
        let mut schema = TableSchema::new(
            "numbers",
            vec![
                Column::new("n", DataType::Integer),
                Column::new("even", DataType::Boolean),
            ],
        );
        if indexed {
            schema = schema.with_index(IndexDef::new("idx_n", ["n"]));
        }
        let mut table = Table::new(schema).unwrap();
        for n in [5i64, 1, 9, 3, 7] {
            let mut fields = FieldValues::new();
            fields.insert("n".into(), Value::Integer(n));
            fields.insert("even".into(), Value::Boolean(n % 2 == 0));
            table.insert(&fields).unwrap();
        }
        table
    }

    fn keys(rows: Vec<(RowId, Row)>) -> Vec<i64> {
        let mut keys: Vec<i64> = rows.iter().filter_map(|(_, row)| row[0].as_i64()).collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_scan_range_with_and_without_index() {
        for indexed in [true, false] {
            let table = numbers(indexed);
            assert_eq!(table.is_indexed("n"), indexed);
            assert_eq!(keys(table.scan_range(&Vec::new(), 0, 3..=7)), vec![3, 5, 7]);
        }
    }

    #[test]
    fn test_scan_range_applies_filter() {
        let table = numbers(true);
        let filter = vec![(1, Value::Boolean(false))];
        assert_eq!(keys(table.scan_range(&filter, 0, 0..=100)), vec![1, 3, 5, 7, 9]);

        let filter = vec![(1, Value::Boolean(true))];
        assert!(table.scan_range(&filter, 0, 0..=100).is_empty());
    }

    #[test]
    fn test_empty_range_scans_nothing() {
        let table = numbers(false);
        #[allow(clippy::reversed_empty_ranges)]
        let rows = table.scan_range(&Vec::new(), 0, 5..=4);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_row_ids_start_at_one() {
        let table = numbers(false);
        let ids: Vec<RowId> = table.scan(&Vec::new()).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_index_on_unknown_column_is_rejected() {
        let mut table = numbers(false);
        let err = table.create_index(IndexDef::new("idx_x", ["x"])).unwrap_err();
        assert!(matches!(err, DbError::ColumnNotFound(..)));
    }

    #[test]
    fn test_composite_index_leads_with_first_column() {
        let mut table = numbers(false);
        table.create_index(IndexDef::new("idx_even_n", ["even", "n"])).unwrap();
        assert!(table.schema().has_leading_index("even"));
        assert!(!table.schema().has_leading_index("n"));
    }

    #[test]
    fn test_schema_index_on_unknown_column_fails_table_creation() {
        let schema = TableSchema::new("numbers", vec![Column::new("n", DataType::Integer)])
            .with_index(IndexDef::new("idx_typo", ["m"]));
        assert!(matches!(Table::new(schema), Err(DbError::ColumnNotFound(..))));

        let schema = TableSchema::new("numbers", vec![Column::new("n", DataType::Integer)])
            .with_index(IndexDef::new("idx_empty", Vec::<String>::new()));
        assert!(matches!(Table::new(schema), Err(DbError::InvalidArgument(_))));
    }
}
