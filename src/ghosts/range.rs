use std::fmt;
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;

/// Inclusive range of key values. `end < start` is a valid, empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyRange {
    start: i64,
    end: i64,
}

impl KeyRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// The `size` keys beginning at `start`, cut short at `i64::MAX`.
    pub fn window(start: i64, size: NonZeroUsize) -> Self {
        let span = i64::try_from(size.get() - 1).unwrap_or(i64::MAX);
        Self::new(start, start.saturating_add(span))
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Number of keys in the range, saturating at `u64::MAX`.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        (self.end.wrapping_sub(self.start) as u64).saturating_add(1)
    }

    pub fn contains(&self, key: i64) -> bool {
        self.start <= key && key <= self.end
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> RangeInclusive<i64> {
        self.start..=self.end
    }
}

impl From<RangeInclusive<i64>> for KeyRange {
    fn from(range: RangeInclusive<i64>) -> Self {
        let (start, end) = range.into_inner();
        Self::new(start, end)
    }
}

impl From<KeyRange> for RangeInclusive<i64> {
    fn from(range: KeyRange) -> Self {
        range.keys()
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
