use super::{GhostOptions, GhostSequence, GhostSource, GhostSpan, Materialized, materialize_range};
use crate::core::{DataType, DbError, Result};
use crate::storage::TableSchema;
use log::warn;
use std::fmt;

/// Ghost capability registered for one table: which integer column is the
/// key and where unbounded sequences start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostModel {
    table: String,
    key_field: String,
    start: i64,
    advisory: Option<IndexAdvisory>,
}

impl GhostModel {
    /// Registers `key_field` of `schema` as a ghost key.
    ///
    /// The column must exist and hold integers. A column that does not lead
    /// any index is accepted, with a warning: ghost queries range-scan it.
    pub fn register(schema: &TableSchema, key_field: impl Into<String>, start: i64) -> Result<Self> {
        let key_field = key_field.into();
        let column = schema
            .schema()
            .get_column(&key_field)
            .ok_or_else(|| DbError::ColumnNotFound(key_field.clone(), schema.name().to_string()))?;

        if column.data_type != DataType::Integer {
            return Err(DbError::UnsupportedKey(format!(
                "column '{}' on '{}' is {}, ghost keys must be INTEGER",
                key_field,
                schema.name(),
                column.data_type
            )));
        }

        let advisory = (!schema.has_leading_index(&key_field)).then(|| IndexAdvisory {
            table: schema.name().to_string(),
            column: key_field.clone(),
        });
        if let Some(advisory) = &advisory {
            warn!("{}", advisory);
        }

        Ok(Self {
            table: schema.name().to_string(),
            key_field,
            start,
            advisory,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    /// Set when the key column leads no index.
    pub fn advisory(&self) -> Option<&IndexAdvisory> {
        self.advisory.as_ref()
    }

    /// Ghosts of `query` as described by `options`: a fully materialized
    /// vector when a range is given, a lazy sequence otherwise.
    pub fn ghosts<'s, S>(&self, source: &'s S, query: S::Query, options: &GhostOptions) -> std::result::Result<Ghosts<'s, S>, S::Error>
    where
        S: GhostSource + ?Sized,
        S::Error: From<DbError>,
    {
        match options.span()? {
            GhostSpan::Bounded(range) => {
                materialize_range(source, &query, &self.key_field, range, &options.defaults)
                    .map(Ghosts::Bounded)
            }
            GhostSpan::Unbounded { start } => Ok(Ghosts::Unbounded(GhostSequence::new(
                source,
                query,
                self.key_field.clone(),
                start.unwrap_or(self.start),
                &options.defaults,
                options.window_size()?,
            ))),
        }
    }
}

/// The key column of a ghost model is not the leading column of any index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexAdvisory {
    pub table: String,
    pub column: String,
}

impl fmt::Display for IndexAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[rustmemodb-ghosts] Column :{} on {} has no leading index. Ghost queries may be slow.",
            self.column, self.table
        )
    }
}

/// Result of [`GhostModel::ghosts`].
pub enum Ghosts<'s, S: GhostSource + ?Sized> {
    Bounded(Vec<Materialized<S::Entity>>),
    Unbounded(GhostSequence<'s, S>),
}

impl<'s, S: GhostSource + ?Sized> Ghosts<'s, S> {
    pub fn is_bounded(&self) -> bool {
        matches!(self, Self::Bounded(_))
    }

    pub fn into_bounded(self) -> Option<Vec<Materialized<S::Entity>>> {
        match self {
            Self::Bounded(items) => Some(items),
            Self::Unbounded(_) => None,
        }
    }

    pub fn into_sequence(self) -> Option<GhostSequence<'s, S>> {
        match self {
            Self::Bounded(_) => None,
            Self::Unbounded(sequence) => Some(sequence),
        }
    }

    /// First `n` elements; fewer only when a bounded result is shorter.
    pub fn take(self, n: usize) -> std::result::Result<Vec<Materialized<S::Entity>>, S::Error> {
        match self {
            Self::Bounded(mut items) => {
                items.truncate(n);
                Ok(items)
            }
            Self::Unbounded(sequence) => sequence.take(n).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Column;
    use crate::storage::IndexDef;

    fn invoices(indexed: bool) -> TableSchema {
        let schema = TableSchema::new(
            "invoices",
            vec![
                Column::new("number", DataType::Integer),
                Column::new("code", DataType::Text),
            ],
        );
        if indexed {
            schema.with_index(IndexDef::new("idx_number", ["number"]))
        } else {
            schema
        }
    }

    #[test]
    fn test_register_indexed_key() {
        let model = GhostModel::register(&invoices(true), "number", 1).unwrap();
        assert_eq!(model.table(), "invoices");
        assert_eq!(model.key_field(), "number");
        assert_eq!(model.start(), 1);
        assert!(model.advisory().is_none());
    }

    #[test]
    fn test_register_unindexed_key_warns() {
        let model = GhostModel::register(&invoices(false), "number", 1).unwrap();
        let advisory = model.advisory().unwrap();
        assert_eq!(
            advisory.to_string(),
            "[rustmemodb-ghosts] Column :number on invoices has no leading index. Ghost queries may be slow."
        );
    }

    #[test]
    fn test_register_rejects_non_integer_key() {
        let err = GhostModel::register(&invoices(true), "code", 1).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedKey(_)));
    }

    #[test]
    fn test_register_rejects_unknown_key() {
        let err = GhostModel::register(&invoices(true), "missing", 1).unwrap_err();
        assert!(matches!(err, DbError::ColumnNotFound(..)));
    }
}
