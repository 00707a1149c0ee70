use super::{DEFAULT_WINDOW_SIZE, KeyRange};
use crate::core::{DbError, FieldValues, Result, Value};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;

/// Options for a ghost query.
///
/// Mirrors the options bag accepted from callers:
/// `{ "from": 1, "to": 5, "default": { "points": 0 }, "batch_size": 100 }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GhostOptions {
    /// Explicit range; takes precedence over `from`/`to`.
    #[serde(skip)]
    pub range: Option<KeyRange>,

    #[serde(default)]
    pub from: Option<i64>,

    #[serde(default)]
    pub to: Option<i64>,

    /// Extra field values for placeholders; these beat query conditions.
    #[serde(default, rename = "default")]
    pub defaults: FieldValues,

    /// Window size of the unbounded path.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

/// What a set of options asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GhostSpan {
    Bounded(KeyRange),
    /// Unbounded sequence; `start` overrides the registered start key.
    Unbounded { start: Option<i64> },
}

impl GhostOptions {
    pub fn new() -> Self {
        Self {
            range: None,
            from: None,
            to: None,
            defaults: FieldValues::new(),
            batch_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// Parse the JSON options bag.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn range(mut self, range: RangeInclusive<i64>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn from_key(mut self, key: i64) -> Self {
        self.from = Some(key);
        self
    }

    pub fn to_key(mut self, key: i64) -> Self {
        self.to = Some(key);
        self
    }

    /// Set one placeholder default
    pub fn with_default(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(field.into(), value.into());
        self
    }

    pub fn with_defaults(mut self, defaults: FieldValues) -> Self {
        self.defaults.extend(defaults);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DbError::InvalidArgument("batch_size must be > 0".to_string()));
        }

        if self.range.is_none() && self.from.is_none() && self.to.is_some() {
            return Err(DbError::InvalidArgument("'to' requires 'from'".to_string()));
        }

        Ok(())
    }

    pub fn window_size(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.batch_size)
            .ok_or_else(|| DbError::InvalidArgument("batch_size must be > 0".to_string()))
    }

    /// Resolve the requested span: an explicit range first, then `from`/`to`,
    /// otherwise an unbounded sequence.
    pub fn span(&self) -> Result<GhostSpan> {
        self.validate()?;

        if let Some(range) = self.range {
            return Ok(GhostSpan::Bounded(range));
        }

        Ok(match (self.from, self.to) {
            (Some(from), Some(to)) => GhostSpan::Bounded(KeyRange::new(from, to)),
            (from, _) => GhostSpan::Unbounded { start: from },
        })
    }
}

impl Default for GhostOptions {
    fn default() -> Self {
        Self::new()
    }
}
