//! The single flat form orchestrator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::config::{FormConfig, SchemaFactory};
use super::props::{FieldGroup, FieldProps, ValidationTask, spawn_field_validation};
use super::submit::{SubmitGuard, SubmitHandler, SubmitOutcome, run_success};
use crate::model::{Value, Values};
use crate::result::ErrorList;
use crate::schema::{ValidationSchema, ValidationStrategy};
use crate::state::{FieldState, FormState, FormStore, Toggle};
use crate::validation::{FormErrors, validate_form};

/// A single flat form.
///
/// Owns a [`FormStore`], runs field-level validation according to each
/// field's strategy, and drives submission. Cheap to clone; clones share
/// state.
///
/// # Example
///
/// ```no_run
/// use formwork::form::{Form, FormConfig, SubmitHandler};
/// use formwork::model::Values;
/// use formwork::schema::ValidationSchema;
/// use formwork::validator;
///
/// # async fn run() {
/// let form = Form::new(
///     FormConfig::new(Values::new().with("name", ""))
///         .validators(|_| {
///             ValidationSchema::new().field("name", validator::non_blank("Required"))
///         }),
/// );
///
/// form.field_props("name").unwrap().on_change("Ada");
/// let outcome = form
///     .handle_submit(SubmitHandler::new(|values: Values| async move {
///         println!("{values:?}");
///         Ok::<_, std::io::Error>(())
///     }))
///     .await;
/// assert!(outcome.is_submitted());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Form {
    store: FormStore,
    strategy: ValidationStrategy,
    validators: Validators,
    submitting: Arc<AtomicBool>,
}

#[derive(Clone)]
struct Validators(SchemaFactory);

impl std::fmt::Debug for Validators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validators(..)")
    }
}

impl Form {
    pub fn new(config: FormConfig) -> Self {
        Self {
            store: FormStore::new(&config.initial_values),
            strategy: config.strategy,
            validators: Validators(config.validators),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The schema for the current values.
    pub fn schema(&self) -> ValidationSchema {
        (self.validators.0)(&self.store.values())
    }

    /// The underlying store.
    pub fn store(&self) -> &FormStore {
        &self.store
    }

    pub fn state(&self) -> Arc<FormState> {
        self.store.state()
    }

    pub fn values(&self) -> Arc<Values> {
        self.store.values()
    }

    pub fn errors(&self) -> Arc<FormErrors> {
        self.store.errors()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn set_errors(&self, key: &str, errors: Option<ErrorList>) {
        self.store.set_errors(key, errors);
    }

    pub fn set_values(&self, update: impl FnOnce(Values) -> Values) {
        self.store.set_values(update);
    }

    /// Mark `key` touched and validate its current value if the field
    /// validates on blur.
    pub fn blur(&self, key: &str) -> ValidationTask {
        self.store.blur(key);
        let value = self.store.values().get(key)?.clone();
        self.validate_field(ValidationStrategy::OnBlur, key, value)
    }

    /// Set `key` to `value` and validate that value if the field validates
    /// on change.
    pub fn change(&self, key: &str, value: Value) -> ValidationTask {
        self.store.field(key)?;
        self.store.change(key, value.clone());
        self.validate_field(ValidationStrategy::OnChange, key, value)
    }

    fn validate_field(
        &self,
        trigger: ValidationStrategy,
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
            move |errors| store.set_errors(&owned_key, errors),
        )
    }

    /// Props for `key`, or `None` for an unknown field.
    pub fn field_props(&self, key: &str) -> Option<FieldProps> {
        self.store.field(key).map(|field| self.bind(key, field))
    }

    /// Props for every field.
    pub fn fields(&self) -> FieldGroup {
        self.store.state().map(|key, field| self.bind(key, field.clone()))
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

    /// Validate the current values and submit them.
    ///
    /// Every field is disabled while the submit runs and re-enabled when it
    /// ends, including when `handler` fails or panics. On a validation
    /// failure every field's errors are replaced by the fresh verdict before
    /// `on_failure` runs.
    pub async fn handle_submit(
        &self,
        handler: SubmitHandler<Values, FormErrors>,
    ) -> SubmitOutcome<FormErrors> {
        let store = self.store.clone();
        let guard = SubmitGuard::begin(&self.submitting, move || store.toggle(Toggle::Enable));
        self.store.toggle(Toggle::Disable);

        let values = self.store.values();
        let schema = (self.validators.0)(&values);

        match validate_form(&values, &schema).await {
            Ok(validated) => {
                self.store.propagate_errors(&FormErrors::new());
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

    /// Restore the initial values and clear every flag.
    pub fn handle_reset(&self) {
        self.store.reset();
    }

    /// Reinitialize from `update(current values)`.
    pub fn handle_reset_with(&self, update: impl FnOnce(Values) -> Values) {
        self.store.reset_with(update);
    }
}
