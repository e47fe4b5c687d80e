//! State of a dynamic list of field groups.

use std::sync::Arc;

use super::field::{self, FieldState, FormAction, FormState, Toggle, init_form};
use super::shared::Shared;
use crate::model::{Value, Values};
use crate::result::ErrorList;
use crate::validation::FormErrors;

/// One [`FormState`] per group. The index is a position, not an identity.
pub type FieldArrayState = Vec<FormState>;

/// A single state change applied by [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldArrayAction {
    /// Add a group at the end.
    Append(Values),
    /// Delete the group at `index`, shifting later groups down.
    Remove { index: usize },
    /// Apply a form action to the group at `index`.
    Group { index: usize, action: FormAction },
    /// Reinitialize from the given groups.
    Reset(Vec<Values>),
    /// Enable or disable every field of every group.
    Toggle(Toggle),
}

/// Build a fresh field-array state.
pub fn init_field_array(values: &[Values]) -> FieldArrayState {
    values.iter().map(init_form).collect()
}

/// Apply `action`, returning the next state. Out-of-range indices leave the
/// state unchanged.
pub fn transition(state: &[FormState], action: FieldArrayAction) -> FieldArrayState {
    match action {
        FieldArrayAction::Append(values) => {
            log::trace!("field array append at {}", state.len());
            let mut next = state.to_vec();
            next.push(init_form(&values));
            next
        }
        FieldArrayAction::Remove { index } if index < state.len() => {
            log::trace!("field array remove at {index}");
            let mut next = state.to_vec();
            next.remove(index);
            next
        }
        FieldArrayAction::Group { index, action } if index < state.len() => {
            let mut next = state.to_vec();
            next[index] = field::transition(&state[index], action);
            next
        }
        FieldArrayAction::Reset(values) => {
            log::trace!("field array reset with {} group(s)", values.len());
            init_field_array(&values)
        }
        FieldArrayAction::Toggle(toggle) => state
            .iter()
            .map(|group| field::transition(group, FormAction::Toggle(toggle)))
            .collect(),
        action => {
            log::debug!(
                "ignoring {action:?}: index out of range for {} group(s)",
                state.len()
            );
            state.to_vec()
        }
    }
}

/// Shared, observable state of a field array.
///
/// The index-addressed counterpart of [`FormStore`](super::FormStore): each
/// group is a form with the same fields, and groups can be appended and
/// removed.
#[derive(Debug, Clone)]
pub struct FieldArrayStore {
    shared: Shared<FieldArrayState>,
}

impl FieldArrayStore {
    /// Create a store from the initial groups.
    pub fn new(initial: &[Values]) -> Self {
        Self {
            shared: Shared::new(init_field_array(initial)),
        }
    }

    /// Apply a raw action.
    pub fn dispatch(&self, action: FieldArrayAction) {
        self.shared.update(|state| transition(state, action));
    }

    fn group_action(&self, index: usize, action: FormAction) {
        self.dispatch(FieldArrayAction::Group { index, action });
    }

    /// The full current state.
    pub fn state(&self) -> Arc<FieldArrayState> {
        self.shared.state()
    }

    /// The current values of every group.
    pub fn values(&self) -> Arc<Vec<Values>> {
        self.shared.values()
    }

    /// The current errors of every group.
    pub fn errors(&self) -> Arc<Vec<FormErrors>> {
        self.shared.errors()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.shared.with_state(|state| state.len())
    }

    /// Returns `true` if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A snapshot of one group.
    pub fn group(&self, index: usize) -> Option<FormState> {
        self.shared.with_state(|state| state.get(index).cloned())
    }

    /// A snapshot of one field of one group.
    pub fn field(&self, index: usize, key: &str) -> Option<FieldState> {
        self.shared.with_state(|state| state.get(index)?.get(key).cloned())
    }

    pub fn append(&self, values: Values) {
        self.dispatch(FieldArrayAction::Append(values));
    }

    pub fn remove(&self, index: usize) {
        self.dispatch(FieldArrayAction::Remove { index });
    }

    pub fn blur(&self, index: usize, key: &str) {
        self.group_action(index, FormAction::Blur { key: key.into() });
    }

    pub fn change(&self, index: usize, key: &str, value: Value) {
        self.group_action(
            index,
            FormAction::Change {
                key: key.into(),
                value,
            },
        );
    }

    pub fn disable(&self, index: usize, key: &str) {
        self.group_action(index, FormAction::Disable { key: key.into() });
    }

    pub fn enable(&self, index: usize, key: &str) {
        self.group_action(index, FormAction::Enable { key: key.into() });
    }

    pub fn set_errors(&self, index: usize, key: &str, errors: Option<ErrorList>) {
        self.group_action(
            index,
            FormAction::SetErrors {
                key: key.into(),
                errors,
            },
        );
    }

    /// Replace one group's values with `update(current values)`.
    ///
    /// `update` runs without the lock held and may read the store.
    pub fn set_values(&self, index: usize, update: impl FnOnce(Values) -> Values) {
        let Some(current) = self.values().get(index).cloned() else {
            log::debug!("ignoring set_values: index {index} out of range");
            return;
        };
        self.group_action(index, FormAction::SetValues(update(current)));
    }

    /// Restore the initial groups exactly.
    pub fn reset(&self) {
        log::trace!("field array reset to initial state");
        self.shared.reset();
    }

    /// Reinitialize from `update(current values)`.
    pub fn reset_with(&self, update: impl FnOnce(Vec<Values>) -> Vec<Values>) {
        let values = update((*self.values()).clone());
        self.dispatch(FieldArrayAction::Reset(values));
    }

    /// Enable or disable every field of every group.
    pub fn toggle(&self, toggle: Toggle) {
        self.dispatch(FieldArrayAction::Toggle(toggle));
    }

    /// Write aggregate validation errors into the groups.
    ///
    /// A group reported as `None` passed and has every field cleared; within
    /// a reported group, fields without an entry are cleared too.
    pub fn propagate_errors(&self, errors: &[Option<FormErrors>]) {
        self.shared.update(|state| {
            let mut next = state.clone();
            for (group, group_errors) in next.iter_mut().zip(errors) {
                for (key, field) in group.iter_mut() {
                    field.errors = group_errors
                        .as_ref()
                        .and_then(|errors| errors.get(key).cloned().flatten());
                }
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn language(name: &str) -> Values {
        Values::new().with("language", name)
    }

    #[test]
    fn test_append_and_remove() {
        let store = FieldArrayStore::new(&[language("Rust")]);
        store.append(language("Go"));
        store.append(language("Zig"));
        assert_eq!(store.len(), 3);

        store.remove(1);
        let values = store.values();
        assert_eq!(values.as_slice(), &[language("Rust"), language("Zig")]);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let store = FieldArrayStore::new(&[language("Rust")]);
        let state = store.state();

        store.remove(5);
        store.blur(3, "language");
        store.set_values(2, |values| values);
        assert!(Arc::ptr_eq(&state, &store.state()));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_group_actions() {
        let store = FieldArrayStore::new(&[language("Rust"), language("Go")]);
        store.change(1, "language", "Zig".into());
        store.blur(1, "language");

        let field = store.field(1, "language").unwrap();
        assert!(field.touched);
        assert_eq!(field.value, Value::from("Zig"));
        assert!(!store.field(0, "language").unwrap().touched);
    }

    #[test]
    fn test_reset_reverts_membership() {
        let store = FieldArrayStore::new(&[language("Rust")]);
        let initial = store.state();
        store.append(language("Go"));
        store.toggle(Toggle::Disable);

        store.reset();
        assert!(Arc::ptr_eq(&initial, &store.state()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_closures_may_read_the_store() {
        let store = FieldArrayStore::new(&[language("Rust"), language("Go")]);
        let reader = store.clone();

        store.set_values(1, |values| {
            let first = reader.values()[0].get_as::<String>("language").unwrap_or_default();
            values.with("language", format!("{first} and Go"))
        });
        assert_eq!(store.values()[1], language("Rust and Go"));

        store.reset_with(|mut groups| {
            groups.truncate(reader.len() - 1);
            groups
        });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_propagate_errors_clears_passing_groups() {
        let store = FieldArrayStore::new(&[language("Rust"), language("Rust")]);
        store.set_errors(0, "language", Some(ErrorList::new("stale")));

        let errors = vec![
            None,
            Some(FormErrors::new().with("language", Some(ErrorList::new("Duplicate")))),
        ];
        store.propagate_errors(&errors);

        assert_eq!(store.field(0, "language").unwrap().errors, None);
        assert_eq!(
            store.field(1, "language").unwrap().errors,
            Some(ErrorList::new("Duplicate"))
        );
    }
}
