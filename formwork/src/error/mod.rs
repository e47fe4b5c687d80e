//! Error types

mod field;
mod list;
mod submit;

pub use field::*;
pub use list::*;
pub use submit::*;
