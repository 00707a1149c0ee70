//! Gap-filling materialization over integer keys.
//!
//! Given a filtered query and a key column, every key in the requested span
//! comes back: the stored entity where a row exists, otherwise a "ghost" (a
//! transient, unsaved entity carrying the query's equality conditions, the
//! caller's defaults and the missing key). Ghosts are never written back.
//!
//! [`materialize_range`] handles a closed range with a single fetch.
//! [`GhostSequence`] walks keys without an upper bound, fetching one window
//! of keys at a time.

mod materialize;
mod model;
mod options;
mod placeholder;
mod range;
mod sequence;
mod source;

pub use materialize::materialize_range;
pub use model::{GhostModel, Ghosts, IndexAdvisory};
pub use options::{GhostOptions, GhostSpan};
pub use placeholder::{Materialized, PlaceholderFactory, merge_fields};
pub use range::KeyRange;
pub use sequence::{DEFAULT_WINDOW_SIZE, GhostSequence, materialize_from};
pub use source::{GhostSource, KeyFilter};
