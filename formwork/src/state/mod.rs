//! Form state: per-field flags, pure transitions and shared stores.
//!
//! The transition functions ([`transition`], [`field_array::transition`]) are
//! pure: they take the current state and an action and return the next state.
//! [`FormStore`] and [`FieldArrayStore`] wrap them in a shared, lock-protected
//! container that orchestrators and callbacks can clone freely.

pub mod field_array;

mod field;
mod shared;
mod store;

pub use field::{
    FieldState, FormAction, FormState, Toggle, errors_of, init_form, transition, values_of,
};
pub use field_array::{FieldArrayAction, FieldArrayState, FieldArrayStore, init_field_array};
pub use store::FormStore;
