//! Field props handed to the binding layer, and field-level validation.

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::model::{FieldMap, Value};
use crate::result::ErrorList;
use crate::schema::{ValidationSchema, ValidationStrategy};
use crate::state::FieldState;

/// A spawned field-level validation, or `None` when the field's strategy
/// did not call for one.
///
/// Awaiting the handle waits for the verdict to be written into state;
/// dropping it lets the validation finish in the background.
pub type ValidationTask = Option<JoinHandle<()>>;

type BlurCallback = Arc<dyn Fn() -> ValidationTask + Send + Sync>;
type ChangeCallback = Arc<dyn Fn(Value) -> ValidationTask + Send + Sync>;

/// A snapshot of one field plus callbacks bound to its orchestrator.
#[derive(Clone)]
pub struct FieldProps {
    pub value: Value,
    pub touched: bool,
    pub disabled: bool,
    pub errors: Option<ErrorList>,
    on_blur: BlurCallback,
    on_change: ChangeCallback,
}

impl FieldProps {
    pub(crate) fn new(
        field: FieldState,
        on_blur: impl Fn() -> ValidationTask + Send + Sync + 'static,
        on_change: impl Fn(Value) -> ValidationTask + Send + Sync + 'static,
    ) -> Self {
        Self {
            value: field.value,
            touched: field.touched,
            disabled: field.disabled,
            errors: field.errors,
            on_blur: Arc::new(on_blur),
            on_change: Arc::new(on_change),
        }
    }

    /// Mark the field touched, validating it if its strategy is `OnBlur`.
    pub fn on_blur(&self) -> ValidationTask {
        (self.on_blur)()
    }

    /// Change the field value, validating it if its strategy is `OnChange`.
    pub fn on_change(&self, value: impl Into<Value>) -> ValidationTask {
        (self.on_change)(value.into())
    }
}

impl fmt::Debug for FieldProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldProps")
            .field("value", &self.value)
            .field("touched", &self.touched)
            .field("disabled", &self.disabled)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

/// Props for every field of one group.
pub type FieldGroup = FieldMap<FieldProps>;

/// Validate `value` for `key` in the background if the field's effective
/// strategy matches `trigger`. The verdict is handed to `apply`.
///
/// Returns `None` when no validation runs, including when called outside a
/// tokio runtime.
pub(crate) fn spawn_field_validation(
    schema: &ValidationSchema,
    default: ValidationStrategy,
    trigger: ValidationStrategy,
    key: &str,
    value: Value,
    apply: impl FnOnce(Option<ErrorList>) + Send + 'static,
) -> ValidationTask {
    let (strategy, validator) = schema.field_config(key, default);
    if strategy != trigger {
        return None;
    }
    let validator = validator?;
    let handle = match Handle::try_current() {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!("skipping {trigger:?} validation for '{key}': {e}");
            return None;
        }
    };

    log::debug!("spawning {trigger:?} validation for '{key}'");
    Some(handle.spawn(async move {
        let verdict = validator.validate(value).await;
        apply(verdict.err());
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator;

    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field_with("name", ValidationStrategy::OnBlur, validator::non_blank("Required"))
    }

    #[test]
    fn test_no_runtime_skips_validation() {
        let task = spawn_field_validation(
            &schema(),
            ValidationStrategy::OnChange,
            ValidationStrategy::OnBlur,
            "name",
            Value::from(""),
            |_| {},
        );
        assert!(task.is_none());
    }

    #[tokio::test]
    async fn test_strategy_mismatch_skips_validation() {
        let task = spawn_field_validation(
            &schema(),
            ValidationStrategy::OnChange,
            ValidationStrategy::OnChange,
            "name",
            Value::from(""),
            |_| {},
        );
        assert!(task.is_none());
    }

    #[tokio::test]
    async fn test_verdict_is_applied() {
        let (tx, rx) = std::sync::mpsc::channel();
        let task = spawn_field_validation(
            &schema(),
            ValidationStrategy::OnSubmit,
            ValidationStrategy::OnBlur,
            "name",
            Value::from(" "),
            move |errors| tx.send(errors).unwrap(),
        );

        task.unwrap().await.unwrap();
        assert_eq!(rx.recv().unwrap(), Some(ErrorList::new("Required")));
    }
}
