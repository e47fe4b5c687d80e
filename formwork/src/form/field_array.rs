//! The field-array orchestrator: a list of groups sharing one schema.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::config::{FieldArrayConfig, FieldArraySchemaFactory};
use super::props::{FieldGroup, FieldProps, ValidationTask, spawn_field_validation};
use super::submit::{SubmitGuard, SubmitHandler, SubmitOutcome, run_success};
use crate::model::{Value, Values};
use crate::result::ErrorList;
use crate::schema::{ValidationSchema, ValidationStrategy};
use crate::state::{FieldArrayState, FieldArrayStore, FieldState, Toggle};
use crate::validation::{FieldArrayErrors, FormErrors, validate_field_array};

/// A dynamic list of field groups sharing one schema.
///
/// The schema factory sees the values of every group, so cross-group rules
/// such as uniqueness are expressed directly in the schema.
#[derive(Debug, Clone)]
pub struct FieldArray {
    store: FieldArrayStore,
    strategy: ValidationStrategy,
    validators: Validators,
    submitting: Arc<AtomicBool>,
}

#[derive(Clone)]
struct Validators(FieldArraySchemaFactory);

impl std::fmt::Debug for Validators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validators(..)")
    }
}

impl FieldArray {
    pub fn new(config: FieldArrayConfig) -> Self {
        Self {
            store: FieldArrayStore::new(&config.initial_values),
            strategy: config.strategy,
            validators: Validators(config.validators),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The group schema for the current values.
    pub fn schema(&self) -> ValidationSchema {
        (self.validators.0)(&self.store.values())
    }

    pub fn store(&self) -> &FieldArrayStore {
        &self.store
    }

    pub fn state(&self) -> Arc<FieldArrayState> {
        self.store.state()
    }

    pub fn values(&self) -> Arc<Vec<Values>> {
        self.store.values()
    }

    pub fn errors(&self) -> Arc<Vec<FormErrors>> {
        self.store.errors()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn append(&self, values: Values) {
        self.store.append(values);
    }

    pub fn remove(&self, index: usize) {
        self.store.remove(index);
    }

    pub fn set_errors(&self, index: usize, key: &str, errors: Option<ErrorList>) {
        self.store.set_errors(index, key, errors);
    }

    pub fn set_values(&self, index: usize, update: impl FnOnce(Values) -> Values) {
        self.store.set_values(index, update);
    }

    pub fn blur(&self, index: usize, key: &str) -> ValidationTask {
        self.store.blur(index, key);
        let value = self.store.values().get(index)?.get(key)?.clone();
        self.validate_field(ValidationStrategy::OnBlur, index, key, value)
    }

    pub fn change(&self, index: usize, key: &str, value: Value) -> ValidationTask {
        self.store.field(index, key)?;
        self.store.change(index, key, value.clone());
        self.validate_field(ValidationStrategy::OnChange, index, key, value)
    }

    fn validate_field(
        &self,
        trigger: ValidationStrategy,
        index: usize,
        key: &str,
        value: Value,
    ) -> ValidationTask {
        let store = self.store.clone();
        let owned_key = key.to_string();
        spawn_field_validation(
            &self.schema(),
            self.strategy,
            trigger,
            key,
            value,
            move |errors| store.set_errors(index, &owned_key, errors),
        )
    }

    /// Props for one field of one group.
    pub fn field_props(&self, index: usize, key: &str) -> Option<FieldProps> {
        self.store
            .field(index, key)
            .map(|field| self.bind(index, key, field))
    }

    /// Props for every field of every group.
    pub fn groups(&self) -> Vec<FieldGroup> {
        self.store
            .state()
            .iter()
            .enumerate()
            .map(|(index, group)| group.map(|key, field| self.bind(index, key, field.clone())))
            .collect()
    }

    fn bind(&self, index: usize, key: &str, field: FieldState) -> FieldProps {
        let (on_blur, blur_key) = (self.clone(), key.to_string());
        let (on_change, change_key) = (self.clone(), key.to_string());
        FieldProps::new(
            field,
            move || on_blur.blur(index, &blur_key),
            move |value| on_change.change(index, &change_key, value),
        )
    }

    /// Validate every group and submit them.
    ///
    /// Succeeds only when every group passes. Groups that passed have their
    /// errors cleared.
    pub async fn handle_submit(
        &self,
        handler: SubmitHandler<Vec<Values>, FieldArrayErrors>,
    ) -> SubmitOutcome<FieldArrayErrors> {
        let store = self.store.clone();
        let guard = SubmitGuard::begin(&self.submitting, move || store.toggle(Toggle::Enable));
        self.store.toggle(Toggle::Disable);

        let values = self.store.values();
        let schema = (self.validators.0)(&values);

        match validate_field_array(&values, &schema).await {
            Ok(validated) => {
                let cleared: FieldArrayErrors = vec![None; values.len()];
                self.store.propagate_errors(&cleared);
                let outcome = run_success(handler.on_success, validated).await;
                drop(guard);
                outcome
            }
            Err(errors) => {
                self.store.propagate_errors(&errors);
                drop(guard);
                if let Some(on_failure) = handler.on_failure {
                    on_failure(&errors);
                }
                SubmitOutcome::Invalid(errors)
            }
        }
    }

    /// Restore the initial groups, reverting appends and removals.
    pub fn handle_reset(&self) {
        self.store.reset();
    }

    pub fn handle_reset_with(&self, update: impl FnOnce(Vec<Values>) -> Vec<Values>) {
        self.store.reset_with(update);
    }
}
