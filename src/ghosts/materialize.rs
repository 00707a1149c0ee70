use super::{GhostSource, KeyFilter, KeyRange, Materialized, PlaceholderFactory};
use crate::core::FieldValues;
use std::collections::HashMap;
use tracing::{Level, event};

/// Every key of `range` in ascending order: the stored entity where one
/// exists, a placeholder built from the query's conditions and `defaults`
/// everywhere else.
///
/// Issues exactly one fetch for a non-empty range and none for an empty one.
/// Any fetch or construction error aborts the whole call.
pub fn materialize_range<S>(
    source: &S,
    query: &S::Query,
    key_field: &str,
    range: KeyRange,
    defaults: &FieldValues,
) -> Result<Vec<Materialized<S::Entity>>, S::Error>
where
    S: GhostSource + ?Sized,
{
    if range.is_empty() {
        return Ok(Vec::new());
    }

    let fetched = source.fetch_where(query, key_field, KeyFilter::covering(range))?;
    let mut stored = index_by_key(source, fetched, key_field, range);
    let factory = PlaceholderFactory::new(source.extract_conditions(query), defaults, key_field);

    event!(Level::TRACE, %range, stored = stored.len(), "materializing ghost range");

    range
        .keys()
        .map(|key| match stored.remove(&key) {
            Some(entity) => Ok(Materialized::stored(entity)),
            None => factory.build(source, query, key),
        })
        .collect()
}

/// Maps fetched entities by key. On duplicate keys the last entity wins.
pub(crate) fn index_by_key<S>(
    source: &S,
    entities: Vec<S::Entity>,
    key_field: &str,
    range: KeyRange,
) -> HashMap<i64, S::Entity>
where
    S: GhostSource + ?Sized,
{
    entities
        .into_iter()
        .filter_map(|entity| source.key_of(&entity, key_field).map(|key| (key, entity)))
        .filter(|(key, _)| range.contains(*key))
        .collect()
}
