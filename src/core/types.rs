use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use super::{DbError, Result, DataType, Value};

pub type Row = Vec<Value>;

/// Row identifier assigned by a table on insert. Ids start at 1.
pub type RowId = i64;

/// Field name to value mapping, ordered by field name.
pub type FieldValues = BTreeMap<String, Value>;

/// Collects `(name, value)` pairs into [`FieldValues`]; later pairs win.
pub fn fields<I, K, V>(pairs: I) -> FieldValues
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    #[serde(default = "nullable_by_default")]
    pub nullable: bool,
    #[serde(default = "null_value")]
    pub default: Value,
}

fn nullable_by_default() -> bool {
    true
}

fn null_value() -> Value {
    Value::Null
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default: Value::Null,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Value used when a row or a new entity does not set this column.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Type check only; NULL is accepted regardless of `nullable`.
    pub fn check_type(&self, value: &Value) -> Result<()> {
        if !self.data_type.is_compatible(value) {
            return Err(DbError::TypeMismatch(format!(
                "Column '{}' expects type {}, got {}",
                self.name,
                self.data_type,
                value.type_name()
            )));
        }
        Ok(())
    }

    pub fn validate(&self, value: &Value) -> Result<()> {
        if value.is_null() && !self.nullable {
            return Err(DbError::ConstraintViolation(format!(
                "Column '{}' cannot be NULL",
                self.name
            )));
        }
        self.check_type(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.find_column_index(name).map(|idx| &self.columns[idx])
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Builds a full row from named fields, filling unset columns with their
    /// defaults. Unknown fields and type mismatches are rejected; NOT NULL is
    /// left to the caller.
    pub fn row_from_fields(&self, table: &str, fields: &FieldValues) -> Result<Row> {
        if let Some(unknown) = fields.keys().find(|name| self.find_column_index(name).is_none()) {
            return Err(DbError::ColumnNotFound(unknown.clone(), table.to_string()));
        }

        self.columns
            .iter()
            .map(|column| {
                let value = fields
                    .get(&column.name)
                    .cloned()
                    .unwrap_or_else(|| column.default.clone());
                column.check_type(&value)?;
                Ok(value)
            })
            .collect()
    }

    pub fn fields_from_row(&self, row: &Row) -> FieldValues {
        self.columns
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.name.clone(), value.clone()))
            .collect()
    }
}
