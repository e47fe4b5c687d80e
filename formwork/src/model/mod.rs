//! Dynamic field values and the ordered maps that hold them.

mod field_map;
mod value;

pub use field_map::FieldMap;
pub use value::{FromValue, Value};

/// The plain values of a flat form, keyed by field name.
pub type Values = FieldMap<Value>;
