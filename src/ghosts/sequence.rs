use super::materialize::index_by_key;
use super::{GhostSource, KeyFilter, KeyRange, Materialized, PlaceholderFactory};
use crate::core::FieldValues;
use std::collections::HashMap;
use std::iter::FusedIterator;
use std::num::NonZeroUsize;
use tracing::{Level, event};

pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Unbounded ghost sequence starting at `start`.
///
/// Nothing is fetched until the first element is pulled.
pub fn materialize_from<'s, S>(
    source: &'s S,
    query: S::Query,
    key_field: impl Into<String>,
    start: i64,
    defaults: &FieldValues,
    window_size: NonZeroUsize,
) -> GhostSequence<'s, S>
where
    S: GhostSource + ?Sized,
{
    GhostSequence::new(source, query, key_field, start, defaults, window_size)
}

/// Pull-based, unbounded sequence of materialized entities.
///
/// Keys are emitted one by one from `start` upwards. The sequence works
/// through contiguous windows of `window_size` keys; a window is fetched the
/// moment its first key is requested and only the current window is held in
/// memory. Each window is a separate fetch, so rows written between fetches
/// show up in later windows only.
///
/// After an error the sequence yields nothing more. It also ends once the key
/// `i64::MAX` has been emitted.
pub struct GhostSequence<'s, S: GhostSource + ?Sized> {
    source: &'s S,
    query: S::Query,
    factory: PlaceholderFactory,
    window_size: NonZeroUsize,
    next_key: Option<i64>,
    window: Option<KeyRange>,
    buffer: HashMap<i64, S::Entity>,
    fetches: usize,
    failed: bool,
}

impl<'s, S: GhostSource + ?Sized> GhostSequence<'s, S> {
    pub fn new(
        source: &'s S,
        query: S::Query,
        key_field: impl Into<String>,
        start: i64,
        defaults: &FieldValues,
        window_size: NonZeroUsize,
    ) -> Self {
        let factory = PlaceholderFactory::new(source.extract_conditions(&query), defaults, key_field);
        Self {
            source,
            query,
            factory,
            window_size,
            next_key: Some(start),
            window: None,
            buffer: HashMap::new(),
            fetches: 0,
            failed: false,
        }
    }

    /// Key of the next element, or `None` once the sequence has ended.
    pub fn next_key(&self) -> Option<i64> {
        if self.failed { None } else { self.next_key }
    }

    /// Bounds of the window currently buffered.
    pub fn window(&self) -> Option<KeyRange> {
        self.window
    }

    pub fn window_size(&self) -> NonZeroUsize {
        self.window_size
    }

    /// Number of window fetches issued so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Stored entities of the current window not yet emitted.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn load_window(&mut self, start: i64) -> Result<(), S::Error> {
        let window = KeyRange::window(start, self.window_size);
        self.buffer.clear();
        self.window = Some(window);
        self.fetches += 1;

        let fetched = self
            .source
            .fetch_where(&self.query, self.factory.key_field(), KeyFilter::covering(window))?;
        self.buffer = index_by_key(self.source, fetched, self.factory.key_field(), window);

        event!(Level::DEBUG, %window, stored = self.buffer.len(), "ghost window loaded");
        Ok(())
    }
}

impl<S: GhostSource + ?Sized> Iterator for GhostSequence<'_, S> {
    type Item = Result<Materialized<S::Entity>, S::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let key = self.next_key?;

        if !self.window.is_some_and(|window| window.contains(key))
            && let Err(err) = self.load_window(key)
        {
            self.failed = true;
            return Some(Err(err));
        }

        let item = match self.buffer.remove(&key) {
            Some(entity) => Ok(Materialized::stored(entity)),
            None => self.factory.build(self.source, &self.query, key),
        };
        if item.is_err() {
            self.failed = true;
        }

        self.next_key = key.checked_add(1);
        Some(item)
    }
}

impl<S: GhostSource + ?Sized> FusedIterator for GhostSequence<'_, S> {}
