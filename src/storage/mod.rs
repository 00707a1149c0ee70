pub mod fixture;
pub mod memory;
pub mod table;

pub use fixture::{Fixture, GhostFixture, TableFixture};
pub use memory::{InMemoryStorage, StorageStats};
pub use table::{IndexDef, Table, TableSchema};
