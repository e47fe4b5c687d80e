//! The composite orchestrator: one flat form plus named field arrays.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use super::config::{
    CompositeConfig, CompositeFieldArraySchemaFactory, CompositeSchemaFactory, CompositeValues,
};
use super::props::{FieldGroup, FieldProps, ValidationTask, spawn_field_validation};
use super::submit::{SubmitGuard, SubmitHandler, SubmitOutcome, run_success};
use crate::model::{FieldMap, Value, Values};
use crate::schema::{ValidationSchema, ValidationStrategy};
use crate::state::{FieldArrayStore, FieldState, FormStore, Toggle};
use crate::validation::{
    CompositeFieldArrayErrors, FieldArrayErrors, FormErrors, validate_composite_field_array,
    validate_form,
};

/// Validation failure of a composite form. A part that passed is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompositeErrors {
    pub form: Option<FormErrors>,
    pub field_array: Option<CompositeFieldArrayErrors>,
}

/// A flat form combined with named field arrays, submitted together.
///
/// The set of field arrays is fixed by the initial values.
#[derive(Debug, Clone)]
pub struct CompositeForm {
    form: FormStore,
    field_arrays: FieldMap<FieldArrayStore>,
    strategy: ValidationStrategy,
    validators: Validators,
    submitting: Arc<AtomicBool>,
}

#[derive(Clone)]
struct Validators {
    form: CompositeSchemaFactory,
    field_array: CompositeFieldArraySchemaFactory,
}

impl std::fmt::Debug for Validators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validators(..)")
    }
}

impl CompositeForm {
    pub fn new(config: CompositeConfig) -> Self {
        let CompositeValues { form, field_array } = &config.initial_values;
        Self {
            form: FormStore::new(form),
            field_arrays: field_array.map(|_, groups| FieldArrayStore::new(groups)),
            strategy: config.strategy,
            validators: Validators {
                form: config.form_validators,
                field_array: config.field_array_validators,
            },
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The flat-form store.
    pub fn form_store(&self) -> &FormStore {
        &self.form
    }

    /// The store of a named field array.
    pub fn field_array_store(&self, name: &str) -> Option<&FieldArrayStore> {
        self.field_arrays.get(name)
    }

    /// A snapshot of every value.
    pub fn values(&self) -> CompositeValues {
        CompositeValues {
            form: (*self.form.values()).clone(),
            field_array: self
                .field_arrays
                .map(|_, store| (*store.values()).clone()),
        }
    }

    /// The current errors of the flat form.
    pub fn errors(&self) -> Arc<FormErrors> {
        self.form.errors()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn append(&self, name: &str, values: Values) {
        match self.field_arrays.get(name) {
            Some(store) => store.append(values),
            None => log::debug!("ignoring append: unknown field array '{name}'"),
        }
    }

    pub fn remove(&self, name: &str, index: usize) {
        match self.field_arrays.get(name) {
            Some(store) => store.remove(index),
            None => log::debug!("ignoring remove: unknown field array '{name}'"),
        }
    }

    fn form_schema(&self) -> ValidationSchema {
        (self.validators.form)(&self.values())
    }

    fn group_schema(&self, name: &str) -> ValidationSchema {
        let mut schemas = (self.validators.field_array)(&self.values());
        schemas
            .get_mut(name)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn blur(&self, key: &str) -> ValidationTask {
        self.form.blur(key);
        let value = self.form.values().get(key)?.clone();
        let store = self.form.clone();
        let owned_key = key.to_string();
        spawn_field_validation(
            &self.form_schema(),
            self.strategy,
            ValidationStrategy::OnBlur,
            key,
            value,
            move |errors| store.set_errors(&owned_key, errors),
        )
    }

    pub fn change(&self, key: &str, value: Value) -> ValidationTask {
        self.form.field(key)?;
        self.form.change(key, value.clone());
        let store = self.form.clone();
        let owned_key = key.to_string();
        spawn_field_validation(
            &self.form_schema(),
            self.strategy,
            ValidationStrategy::OnChange,
            key,
            value,
            move |errors| store.set_errors(&owned_key, errors),
        )
    }

    pub fn blur_group(&self, name: &str, index: usize, key: &str) -> ValidationTask {
        let store = self.field_arrays.get(name)?.clone();
        store.blur(index, key);
        let value = store.values().get(index)?.get(key)?.clone();
        self.validate_group_field(ValidationStrategy::OnBlur, name, store, index, key, value)
    }

    pub fn change_group(
        &self,
        name: &str,
        index: usize,
        key: &str,
        value: Value,
    ) -> ValidationTask {
        let store = self.field_arrays.get(name)?.clone();
        store.field(index, key)?;
        store.change(index, key, value.clone());
        self.validate_group_field(ValidationStrategy::OnChange, name, store, index, key, value)
    }

    fn validate_group_field(
        &self,
        trigger: ValidationStrategy,
        name: &str,
        store: FieldArrayStore,
        index: usize,
        key: &str,
        value: Value,
    ) -> ValidationTask {
        let owned_key = key.to_string();
        spawn_field_validation(
            &self.group_schema(name),
            self.strategy,
            trigger,
            key,
            value,
            move |errors| store.set_errors(index, &owned_key, errors),
        )
    }

    /// Props for a field of the flat form.
    pub fn field_props(&self, key: &str) -> Option<FieldProps> {
        self.form.field(key).map(|field| self.bind(key, field))
    }

    /// Props for every field of the flat form.
    pub fn fields(&self) -> FieldGroup {
        self.form
            .state()
            .map(|key, field| self.bind(key, field.clone()))
    }

    /// Props for every group of a named field array.
    pub fn groups(&self, name: &str) -> Option<Vec<FieldGroup>> {
        let state = self.field_arrays.get(name)?.state();
        Some(
            state
                .iter()
                .enumerate()
                .map(|(index, group)| {
                    group.map(|key, field| self.bind_group(name, index, key, field.clone()))
                })
                .collect(),
        )
    }

    fn bind(&self, key: &str, field: FieldState) -> FieldProps {
        let (on_blur, blur_key) = (self.clone(), key.to_string());
        let (on_change, change_key) = (self.clone(), key.to_string());
        FieldProps::new(
            field,
            move || on_blur.blur(&blur_key),
            move |value| on_change.change(&change_key, value),
        )
    }

    fn bind_group(&self, name: &str, index: usize, key: &str, field: FieldState) -> FieldProps {
        let (on_blur, blur_name, blur_key) = (self.clone(), name.to_string(), key.to_string());
        let (on_change, change_name, change_key) =
            (self.clone(), name.to_string(), key.to_string());
        FieldProps::new(
            field,
            move || on_blur.blur_group(&blur_name, index, &blur_key),
            move |value| on_change.change_group(&change_name, index, &change_key, value),
        )
    }

    fn toggle(&self, toggle: Toggle) {
        self.form.toggle(toggle);
        for store in self.field_arrays.values() {
            store.toggle(toggle);
        }
    }

    /// Validate the flat form and every field array concurrently and submit
    /// them together.
    ///
    /// Every store has its errors replaced by the fresh verdict, so a part
    /// that passes never keeps errors from an earlier attempt.
    pub async fn handle_submit(
        &self,
        handler: SubmitHandler<CompositeValues, CompositeErrors>,
    ) -> SubmitOutcome<CompositeErrors> {
        let this = self.clone();
        let guard = SubmitGuard::begin(&self.submitting, move || this.toggle(Toggle::Enable));
        self.toggle(Toggle::Disable);

        let values = self.values();
        let form_schema = (self.validators.form)(&values);
        let array_schemas = (self.validators.field_array)(&values);

        let (form, field_array) = futures::join!(
            validate_form(&values.form, &form_schema),
            validate_composite_field_array(&values.field_array, &array_schemas),
        );

        let errors = match (form, field_array) {
            (Ok(form), Ok(field_array)) => {
                self.propagate_errors(&CompositeErrors::default());
                let validated = CompositeValues { form, field_array };
                let outcome = run_success(handler.on_success, validated).await;
                drop(guard);
                return outcome;
            }
            (form, field_array) => CompositeErrors {
                form: form.err(),
                field_array: field_array.err(),
            },
        };

        self.propagate_errors(&errors);
        drop(guard);
        if let Some(on_failure) = handler.on_failure {
            on_failure(&errors);
        }
        SubmitOutcome::Invalid(errors)
    }

    fn propagate_errors(&self, errors: &CompositeErrors) {
        self.form
            .propagate_errors(errors.form.as_ref().unwrap_or(&FormErrors::new()));

        for (name, store) in self.field_arrays.iter() {
            let reported = errors
                .field_array
                .as_ref()
                .and_then(|arrays| arrays.get(name))
                .and_then(Option::as_ref);
            match reported {
                Some(group_errors) => store.propagate_errors(group_errors),
                None => {
                    let cleared: FieldArrayErrors = vec![None; store.len()];
                    store.propagate_errors(&cleared);
                }
            }
        }
    }

    /// Restore every store to its initial state.
    pub fn handle_reset(&self) {
        self.form.reset();
        for store in self.field_arrays.values() {
            store.reset();
        }
    }

    /// Reinitialize every store from `update(current values)`. Field arrays
    /// missing from the updated values are emptied.
    pub fn handle_reset_with(&self, update: impl FnOnce(CompositeValues) -> CompositeValues) {
        let CompositeValues { form, field_array } = update(self.values());
        self.form.reset_with(|_| form);
        for (name, store) in self.field_arrays.iter() {
            let groups = field_array.get(name).cloned().unwrap_or_default();
            store.reset_with(|_| groups);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ErrorList;
    use crate::validator;

    fn composite() -> CompositeForm {
        let initial = CompositeValues {
            form: Values::new().with("team", ""),
            field_array: FieldMap::new()
                .with("members", vec![Values::new().with("name", "Ada")]),
        };
        CompositeForm::new(
            CompositeConfig::new(initial)
                .form_validators(|_| {
                    ValidationSchema::new().field("team", validator::non_blank("Team required"))
                })
                .field_array_validators(|_| {
                    let schema = ValidationSchema::new()
                        .field("name", validator::non_blank("Name required"));
                    FieldMap::new().with("members", schema)
                }),
        )
    }

    #[tokio::test]
    async fn test_submit_reports_each_part() {
        let form = composite();
        form.append("members", Values::new().with("name", " "));

        let outcome = form
            .handle_submit(SubmitHandler::new(|_: CompositeValues| async {
                Ok::<_, std::io::Error>(())
            }))
            .await;

        let errors = outcome.errors().unwrap();
        assert!(errors.form.is_some());
        let members = errors
            .field_array
            .as_ref()
            .and_then(|arrays| arrays.get("members").cloned().flatten())
            .unwrap();
        assert!(members[0].is_none());
        assert!(members[1].is_some());
        assert_eq!(
            form.field_array_store("members").unwrap().field(1, "name").unwrap().errors,
            Some(ErrorList::new("Name required"))
        );
    }

    #[tokio::test]
    async fn test_passing_arrays_are_cleared() {
        let form = composite();
        let members = form.field_array_store("members").unwrap();
        members.set_errors(0, "name", Some(ErrorList::new("stale")));

        let outcome = form
            .handle_submit(SubmitHandler::new(|_: CompositeValues| async {
                Ok::<_, std::io::Error>(())
            }))
            .await;

        let errors = outcome.errors().unwrap();
        assert_eq!(errors.field_array, None);
        assert_eq!(members.field(0, "name").unwrap().errors, None);
        assert_eq!(
            form.form_store().field("team").unwrap().errors,
            Some(ErrorList::new("Team required"))
        );
    }

    #[tokio::test]
    async fn test_submit_success_and_reset() {
        let form = composite();
        form.change("team", "Core".into());
        form.append("members", Values::new().with("name", "Grace"));

        let outcome = form
            .handle_submit(SubmitHandler::new(|values: CompositeValues| async move {
                assert_eq!(values.field_array.get("members").map(Vec::len), Some(2));
                Ok::<_, std::io::Error>(())
            }))
            .await;
        assert!(outcome.is_submitted());

        form.handle_reset();
        assert_eq!(form.values(), composite().values());
    }

    #[tokio::test]
    async fn test_group_props() {
        let form = CompositeForm::new(
            CompositeConfig::new(composite().values())
                .strategy(ValidationStrategy::OnChange)
                .field_array_validators(|_| {
                    let schema = ValidationSchema::new()
                        .field("name", validator::non_blank("Name required"));
                    FieldMap::new().with("members", schema)
                }),
        );

        let groups = form.groups("members").unwrap();
        groups[0].get("name").unwrap().on_change("").unwrap().await.unwrap();
        assert_eq!(
            form.field_array_store("members").unwrap().field(0, "name").unwrap().errors,
            Some(ErrorList::new("Name required"))
        );
        assert!(form.groups("unknown").is_none());
    }
}
