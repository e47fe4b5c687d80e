//! Per-field state and the pure form transition function.

use serde::{Deserialize, Serialize};

use crate::model::{FieldMap, Value, Values};
use crate::result::ErrorList;
use crate::validation::FormErrors;

/// State of a single form field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldState {
    pub value: Value,
    pub touched: bool,
    pub disabled: bool,
    pub errors: Option<ErrorList>,
}

impl FieldState {
    /// A fresh, untouched, enabled field without errors.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }
}

/// State of a whole form, one entry per field.
pub type FormState = FieldMap<FieldState>;

/// Enable or disable every field at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Enable,
    Disable,
}

/// A single state change applied by [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    /// Mark a field as touched.
    Blur { key: String },
    /// Replace a field's value.
    Change { key: String, value: Value },
    /// Disable a field.
    Disable { key: String },
    /// Enable a field.
    Enable { key: String },
    /// Replace a field's errors.
    SetErrors {
        key: String,
        errors: Option<ErrorList>,
    },
    /// Replace the values of existing fields, keeping their flags.
    SetValues(Values),
    /// Reinitialize every field from the given values.
    Reset(Values),
    /// Enable or disable every field.
    Toggle(Toggle),
}

impl FormAction {
    fn key(&self) -> Option<&str> {
        match self {
            FormAction::Blur { key }
            | FormAction::Change { key, .. }
            | FormAction::Disable { key }
            | FormAction::Enable { key }
            | FormAction::SetErrors { key, .. } => Some(key),
            FormAction::SetValues(_) | FormAction::Reset(_) | FormAction::Toggle(_) => None,
        }
    }
}

/// Build a fresh form state from values.
pub fn init_form(values: &Values) -> FormState {
    values.map(|_, value| FieldState::new(value.clone()))
}

/// Project the current values.
pub fn values_of(state: &FormState) -> Values {
    state.map(|_, field| field.value.clone())
}

/// Project the current errors.
pub fn errors_of(state: &FormState) -> FormErrors {
    state.map(|_, field| field.errors.clone())
}

/// Apply `action` to `state`, returning the next state.
///
/// The field set is fixed at creation: actions naming an unknown field leave
/// the state unchanged, and [`FormAction::SetValues`] ignores keys the form
/// does not have.
pub fn transition(state: &FormState, action: FormAction) -> FormState {
    if let Some(key) = action.key() {
        if !state.contains_key(key) {
            log::debug!("ignoring {action:?}: unknown field '{key}'");
            return state.clone();
        }
    }
    log::trace!("form transition: {action:?}");

    let mut next = state.clone();
    match action {
        FormAction::Blur { key } => {
            if let Some(field) = next.get_mut(&key) {
                field.touched = true;
            }
        }
        FormAction::Change { key, value } => {
            if let Some(field) = next.get_mut(&key) {
                field.value = value;
            }
        }
        FormAction::Disable { key } => {
            if let Some(field) = next.get_mut(&key) {
                field.disabled = true;
            }
        }
        FormAction::Enable { key } => {
            if let Some(field) = next.get_mut(&key) {
                field.disabled = false;
            }
        }
        FormAction::SetErrors { key, errors } => {
            if let Some(field) = next.get_mut(&key) {
                field.errors = errors;
            }
        }
        FormAction::SetValues(values) => {
            for (key, value) in values {
                if let Some(field) = next.get_mut(&key) {
                    field.value = value;
                }
            }
        }
        FormAction::Reset(values) => next = init_form(&values),
        FormAction::Toggle(toggle) => {
            let disabled = toggle == Toggle::Disable;
            for (_, field) in next.iter_mut() {
                field.disabled = disabled;
            }
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> FormState {
        init_form(&Values::new().with("name", "Ada").with("age", 36i64))
    }

    #[test]
    fn test_init_form() {
        let state = state();
        assert_eq!(state.get("name"), Some(&FieldState::new("Ada")));
        assert_eq!(values_of(&state).get("age"), Some(&Value::Int(36)));
        assert!(errors_of(&state).values().all(Option::is_none));
    }

    #[test]
    fn test_field_actions() {
        let state = transition(&state(), FormAction::Blur { key: "name".into() });
        let state = transition(
            &state,
            FormAction::Change {
                key: "name".into(),
                value: "Grace".into(),
            },
        );
        let state = transition(
            &state,
            FormAction::SetErrors {
                key: "age".into(),
                errors: Some(ErrorList::new("Too young")),
            },
        );

        let name = state.get("name").unwrap();
        assert!(name.touched);
        assert_eq!(name.value, Value::from("Grace"));
        assert_eq!(
            state.get("age").unwrap().errors,
            Some(ErrorList::new("Too young"))
        );
    }

    #[test]
    fn test_unknown_key_is_noop() {
        let before = state();
        let after = transition(&before, FormAction::Disable { key: "nope".into() });
        assert_eq!(before, after);
    }

    #[test]
    fn test_set_values_keeps_flags_and_keys() {
        let state = transition(&state(), FormAction::Blur { key: "name".into() });
        let state = transition(
            &state,
            FormAction::SetValues(Values::new().with("name", "Grace").with("extra", 1i64)),
        );

        assert_eq!(state.len(), 2);
        assert!(!state.contains_key("extra"));
        let name = state.get("name").unwrap();
        assert!(name.touched);
        assert_eq!(name.value, Value::from("Grace"));
    }

    #[test]
    fn test_toggle_and_reset() {
        let state = transition(&state(), FormAction::Toggle(Toggle::Disable));
        assert!(state.values().all(|field| field.disabled));

        let state = transition(&state, FormAction::Toggle(Toggle::Enable));
        assert!(state.values().all(|field| !field.disabled));

        let state = transition(&state, FormAction::Reset(Values::new().with("name", "")));
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["name"]);
    }
}
