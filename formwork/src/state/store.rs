//! Shared store owning one form's state.

use std::sync::Arc;

use super::field::{FieldState, FormAction, FormState, Toggle, init_form, transition};
use super::shared::Shared;
use crate::model::{Value, Values};
use crate::result::ErrorList;
use crate::validation::FormErrors;

/// Shared, observable state of a single form.
///
/// `FormStore` is a cheap-to-clone handle; clones observe and mutate the same
/// state. Every mutation runs through the pure [`transition`] function under a
/// write lock, so concurrent writers are applied one at a time and the last
/// one wins.
///
/// The [`values`](Self::values) and [`errors`](Self::errors) views are
/// `Arc`s that stay pointer-identical while their contents do not change,
/// so observers can detect changes with [`Arc::ptr_eq`].
///
/// # Example
///
/// ```
/// use formwork::model::Values;
/// use formwork::state::FormStore;
///
/// let store = FormStore::new(&Values::new().with("name", ""));
/// store.change("name", "Ada".into());
/// store.blur("name");
///
/// let field = store.field("name").unwrap();
/// assert!(field.touched);
/// assert!(store.is_dirty());
/// ```
#[derive(Debug, Clone)]
pub struct FormStore {
    shared: Shared<FormState>,
}

impl FormStore {
    /// Create a store from an initial-values snapshot.
    pub fn new(initial: &Values) -> Self {
        Self {
            shared: Shared::new(init_form(initial)),
        }
    }

    /// Apply a raw action.
    pub fn dispatch(&self, action: FormAction) {
        self.shared.update(|state| transition(state, action));
    }

    /// The full current state.
    pub fn state(&self) -> Arc<FormState> {
        self.shared.state()
    }

    /// The current values.
    pub fn values(&self) -> Arc<Values> {
        self.shared.values()
    }

    /// The current errors.
    pub fn errors(&self) -> Arc<FormErrors> {
        self.shared.errors()
    }

    /// A snapshot of one field.
    pub fn field(&self, key: &str) -> Option<FieldState> {
        self.shared.with_state(|state| state.get(key).cloned())
    }

    pub fn blur(&self, key: &str) {
        self.dispatch(FormAction::Blur { key: key.into() });
    }

    pub fn change(&self, key: &str, value: Value) {
        self.dispatch(FormAction::Change {
            key: key.into(),
            value,
        });
    }

    pub fn disable(&self, key: &str) {
        self.dispatch(FormAction::Disable { key: key.into() });
    }

    pub fn enable(&self, key: &str) {
        self.dispatch(FormAction::Enable { key: key.into() });
    }

    pub fn set_errors(&self, key: &str, errors: Option<ErrorList>) {
        self.dispatch(FormAction::SetErrors {
            key: key.into(),
            errors,
        });
    }

    /// Replace values with `update(current values)`. Touched, disabled and
    /// error flags are kept.
    ///
    /// `update` runs without the lock held and may read the store; a write
    /// made by another handle in the meantime is overwritten.
    pub fn set_values(&self, update: impl FnOnce(Values) -> Values) {
        let values = update((*self.values()).clone());
        self.dispatch(FormAction::SetValues(values));
    }

    /// Restore the initial state exactly.
    pub fn reset(&self) {
        log::trace!("form reset to initial state");
        self.shared.reset();
    }

    /// Reinitialize every field from `update(current values)`.
    pub fn reset_with(&self, update: impl FnOnce(Values) -> Values) {
        let values = update((*self.values()).clone());
        self.dispatch(FormAction::Reset(values));
    }

    /// Enable or disable every field.
    pub fn toggle(&self, toggle: Toggle) {
        self.dispatch(FormAction::Toggle(toggle));
    }

    /// Write aggregate validation errors into the fields.
    ///
    /// Fields missing from `errors` are cleared, so errors from an earlier
    /// validation never linger.
    pub fn propagate_errors(&self, errors: &FormErrors) {
        self.shared.update(|state| {
            let mut next = state.clone();
            for (key, field) in next.iter_mut() {
                field.errors = errors.get(key).cloned().flatten();
            }
            log::trace!("propagating errors to {} field(s)", next.len());
            next
        });
    }

    /// Check if the state has been modified since last check
    pub fn is_dirty(&self) -> bool {
        self.shared.is_dirty()
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.shared.clear_dirty();
    }
}
