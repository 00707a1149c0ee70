use super::KeyRange;
use crate::core::FieldValues;

/// Key constraint passed to [`GhostSource::fetch_where`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFilter {
    Value(i64),
    Range(KeyRange),
}

impl KeyFilter {
    /// Filter matching exactly the keys of `range`; a one-key range becomes
    /// an equality filter.
    pub fn covering(range: KeyRange) -> Self {
        if range.len() == 1 {
            Self::Value(range.start())
        } else {
            Self::Range(range)
        }
    }

    pub fn as_range(&self) -> KeyRange {
        match *self {
            Self::Value(key) => KeyRange::new(key, key),
            Self::Range(range) => range,
        }
    }
}

/// The host data layer ghosts are materialized over.
///
/// Implementors supply filtered fetches, the equality conditions of a query
/// and construction of unsaved entities. Errors are passed back to the
/// caller exactly as the implementor returns them.
pub trait GhostSource {
    /// A filtered relation over one entity type.
    type Query: Clone;
    type Entity;
    type Error;

    /// Stored entities matching `query` whose `field` satisfies `filter`.
    fn fetch_where(&self, query: &Self::Query, field: &str, filter: KeyFilter) -> Result<Vec<Self::Entity>, Self::Error>;

    /// Equality conditions already applied to `query`.
    fn extract_conditions(&self, query: &Self::Query) -> FieldValues;

    /// A new, unsaved entity of the query's target type with `fields` set.
    fn new_entity(&self, query: &Self::Query, fields: FieldValues) -> Result<Self::Entity, Self::Error>;

    /// Integer value of `field` on `entity`, if it has one.
    fn key_of(&self, entity: &Self::Entity, field: &str) -> Option<i64>;
}
