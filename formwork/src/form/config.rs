//! Orchestrator configuration types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{FieldMap, Values};
use crate::schema::{ValidationSchema, ValidationStrategy};

/// Builds a form schema from the current values.
pub type SchemaFactory = Arc<dyn Fn(&Values) -> ValidationSchema + Send + Sync>;

/// Builds a group schema from the current values of every group.
pub type FieldArraySchemaFactory = Arc<dyn Fn(&[Values]) -> ValidationSchema + Send + Sync>;

/// Builds the flat-form schema of a composite form.
pub type CompositeSchemaFactory = Arc<dyn Fn(&CompositeValues) -> ValidationSchema + Send + Sync>;

/// Builds one group schema per named field array of a composite form.
pub type CompositeFieldArraySchemaFactory =
    Arc<dyn Fn(&CompositeValues) -> FieldMap<ValidationSchema> + Send + Sync>;

/// The values of a composite form: one flat form plus named field arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeValues {
    pub form: Values,
    pub field_array: FieldMap<Vec<Values>>,
}

/// Configuration for a [`Form`](super::Form).
///
/// # Example
///
/// ```
/// use formwork::form::FormConfig;
/// use formwork::model::Values;
/// use formwork::schema::{ValidationSchema, ValidationStrategy};
/// use formwork::validator;
///
/// let config = FormConfig::new(Values::new().with("name", ""))
///     .strategy(ValidationStrategy::OnBlur)
///     .validators(|_| ValidationSchema::new().field("name", validator::non_blank("Required")));
/// ```
#[derive(Clone)]
pub struct FormConfig {
    /// Values the form starts with and resets to.
    pub initial_values: Values,

    /// Default field-level validation strategy.
    pub strategy: ValidationStrategy,

    /// Schema factory, called with the current values.
    pub validators: SchemaFactory,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            initial_values: Values::new(),
            strategy: ValidationStrategy::default(),
            validators: Arc::new(|_: &Values| ValidationSchema::new()),
        }
    }
}

impl FormConfig {
    /// Create a config with the given initial values and no validation.
    pub fn new(initial_values: Values) -> Self {
        Self {
            initial_values,
            ..Default::default()
        }
    }

    /// Set the default validation strategy.
    pub fn strategy(mut self, strategy: ValidationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the schema factory.
    pub fn validators(
        mut self,
        validators: impl Fn(&Values) -> ValidationSchema + Send + Sync + 'static,
    ) -> Self {
        self.validators = Arc::new(validators);
        self
    }
}

impl fmt::Debug for FormConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormConfig")
            .field("initial_values", &self.initial_values)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Configuration for a [`FieldArray`](super::FieldArray).
#[derive(Clone)]
pub struct FieldArrayConfig {
    pub initial_values: Vec<Values>,
    pub strategy: ValidationStrategy,
    pub validators: FieldArraySchemaFactory,
}

impl Default for FieldArrayConfig {
    fn default() -> Self {
        Self {
            initial_values: Vec::new(),
            strategy: ValidationStrategy::default(),
            validators: Arc::new(|_: &[Values]| ValidationSchema::new()),
        }
    }
}

impl FieldArrayConfig {
    pub fn new(initial_values: Vec<Values>) -> Self {
        Self {
            initial_values,
            ..Default::default()
        }
    }

    pub fn strategy(mut self, strategy: ValidationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the schema factory, called with the current values of every group.
    pub fn validators(
        mut self,
        validators: impl Fn(&[Values]) -> ValidationSchema + Send + Sync + 'static,
    ) -> Self {
        self.validators = Arc::new(validators);
        self
    }
}

impl fmt::Debug for FieldArrayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldArrayConfig")
            .field("initial_values", &self.initial_values)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Configuration for a [`CompositeForm`](super::CompositeForm).
///
/// Both schema factories receive the full [`CompositeValues`], so rules for
/// the flat form may depend on the arrays and vice versa.
#[derive(Clone)]
pub struct CompositeConfig {
    pub initial_values: CompositeValues,
    pub strategy: ValidationStrategy,
    pub form_validators: CompositeSchemaFactory,
    pub field_array_validators: CompositeFieldArraySchemaFactory,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            initial_values: CompositeValues::default(),
            strategy: ValidationStrategy::default(),
            form_validators: Arc::new(|_: &CompositeValues| ValidationSchema::new()),
            field_array_validators: Arc::new(|_: &CompositeValues| FieldMap::new()),
        }
    }
}

impl CompositeConfig {
    pub fn new(initial_values: CompositeValues) -> Self {
        Self {
            initial_values,
            ..Default::default()
        }
    }

    pub fn strategy(mut self, strategy: ValidationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the flat-form schema factory.
    pub fn form_validators(
        mut self,
        validators: impl Fn(&CompositeValues) -> ValidationSchema + Send + Sync + 'static,
    ) -> Self {
        self.form_validators = Arc::new(validators);
        self
    }

    /// Set the field-array schema factory. Arrays without a schema are not
    /// validated.
    pub fn field_array_validators(
        mut self,
        validators: impl Fn(&CompositeValues) -> FieldMap<ValidationSchema> + Send + Sync + 'static,
    ) -> Self {
        self.field_array_validators = Arc::new(validators);
        self
    }
}

impl fmt::Debug for CompositeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeConfig")
            .field("initial_values", &self.initial_values)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = FormConfig::default();
        assert_eq!(config.strategy, ValidationStrategy::OnSubmit);
        assert!((config.validators)(&config.initial_values).is_empty());
    }

    #[test]
    fn test_composite_values_from_json() {
        let values: CompositeValues = serde_json::from_str(
            r#"{"form": {"name": "Ada"}, "field_array": {"languages": [{"language": "Rust"}]}}"#,
        )
        .unwrap();

        assert_eq!(values.form.get_as::<String>("name"), Ok("Ada".to_string()));
        assert_eq!(values.field_array.get("languages").map(Vec::len), Some(1));
    }
}
