pub mod error;
pub mod types;
pub mod value;

pub use error::{DbError, Result};
pub use types::{Column, FieldValues, Row, RowId, Schema, fields};
pub use value::{DataType, Value};
