//! Filtered relations over a table and the records they return.

mod record;

pub use record::Record;

use crate::core::{DbError, FieldValues, Result, Value};

/// A table plus the equality conditions applied to it.
///
/// This is the relation a caller narrows down before asking for ghosts; the
/// conditions double as the attributes every ghost of the relation inherits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    table: String,
    conditions: FieldValues,
}

impl Query {
    /// Every row of `table`.
    pub fn all(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: FieldValues::new(),
        }
    }

    /// Adds `field = value`. A second filter on the same field replaces the first.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    /// The rows of `child_table` that belong to `owner` through `foreign_key`.
    pub fn association(owner: &Record, child_table: impl Into<String>, foreign_key: impl Into<String>) -> Result<Self> {
        let Some(owner_id) = owner.id() else {
            return Err(DbError::InvalidArgument(format!(
                "cannot scope an association on an unsaved '{}' record",
                owner.table()
            )));
        };
        Ok(Self::all(child_table).filter(foreign_key, owner_id))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn conditions(&self) -> &FieldValues {
        &self.conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_replaces_same_field() {
        let query = Query::all("progress_levels")
            .filter("completed", true)
            .filter("user_id", 1)
            .filter("completed", false);

        assert_eq!(query.conditions().len(), 2);
        assert_eq!(query.conditions()["completed"], Value::Boolean(false));
    }

    #[test]
    fn test_association_requires_saved_owner() {
        let owner = Record::transient("users", FieldValues::new());
        assert!(matches!(
            Query::association(&owner, "progress_levels", "user_id"),
            Err(DbError::InvalidArgument(_))
        ));

        let owner = Record::stored("users", 7, FieldValues::new());
        let query = Query::association(&owner, "progress_levels", "user_id").unwrap();
        assert_eq!(query.table(), "progress_levels");
        assert_eq!(query.conditions()["user_id"], Value::Integer(7));
    }
}
