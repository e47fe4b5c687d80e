//! Validation schemas: which validator runs for which field, and when.

use serde::{Deserialize, Serialize};

use crate::model::{FieldMap, FromValue, Value};
use crate::result::ErrorList;
use crate::validator::Validator;

/// When field-level validation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStrategy {
    /// Validate on every change.
    OnChange,
    /// Validate when the field loses focus.
    OnBlur,
    /// Validate only on submit.
    #[default]
    OnSubmit,
}

/// How a single field is validated.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// No validation; the value passes through on submit.
    Skip,
    /// Validate with the form-level strategy.
    Validate(Validator<Value, Value>),
    /// Validate with a field-specific strategy.
    WithStrategy {
        strategy: ValidationStrategy,
        validator: Validator<Value, Value>,
    },
}

impl FieldRule {
    /// The validator, if any.
    pub fn validator(&self) -> Option<&Validator<Value, Value>> {
        match self {
            FieldRule::Skip => None,
            FieldRule::Validate(validator) | FieldRule::WithStrategy { validator, .. } => {
                Some(validator)
            }
        }
    }

    /// The strategy this rule runs under, given the form default.
    ///
    /// Skipped fields report [`ValidationStrategy::OnSubmit`] so they never
    /// trigger field-level validation.
    pub fn strategy(&self, default: ValidationStrategy) -> ValidationStrategy {
        match self {
            FieldRule::Skip => ValidationStrategy::OnSubmit,
            FieldRule::Validate(_) => default,
            FieldRule::WithStrategy { strategy, .. } => *strategy,
        }
    }
}

/// Lift a typed validator to operate on dynamic field values.
///
/// The input is converted with [`FromValue`]; a conversion failure becomes the
/// field's error message.
pub fn lift<T, U>(key: &str, validator: Validator<T, U>) -> Validator<Value, Value>
where
    T: FromValue + Send + 'static,
    U: Into<Value> + Send + 'static,
{
    let key = key.to_string();
    Validator::new(move |value: Value| {
        let converted = T::from_value(&key, value);
        let validator = validator.clone();
        async move {
            match converted {
                Ok(input) => validator.validate(input).await.map(Into::into),
                Err(e) => Err(ErrorList::new(e.to_string())),
            }
        }
    })
}

/// An ordered map from field name to [`FieldRule`].
///
/// Built with a fluent API:
///
/// ```
/// use formwork::schema::{ValidationSchema, ValidationStrategy};
/// use formwork::validator;
///
/// let schema = ValidationSchema::new()
///     .field("name", validator::non_blank("Required"))
///     .field_with("email", ValidationStrategy::OnBlur, validator::email("Invalid email"))
///     .skip("notes");
/// assert_eq!(schema.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    rules: FieldMap<FieldRule>,
}

impl ValidationSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `key` with a typed validator under the form-level strategy.
    pub fn field<T, U>(self, key: impl Into<String>, validator: Validator<T, U>) -> Self
    where
        T: FromValue + Send + 'static,
        U: Into<Value> + Send + 'static,
    {
        let key = key.into();
        let validator = lift(&key, validator);
        self.rule(key, FieldRule::Validate(validator))
    }

    /// Validate `key` with a typed validator under its own strategy.
    pub fn field_with<T, U>(
        self,
        key: impl Into<String>,
        strategy: ValidationStrategy,
        validator: Validator<T, U>,
    ) -> Self
    where
        T: FromValue + Send + 'static,
        U: Into<Value> + Send + 'static,
    {
        let key = key.into();
        let validator = lift(&key, validator);
        self.rule(key, FieldRule::WithStrategy { strategy, validator })
    }

    /// Pass `key` through unvalidated.
    pub fn skip(self, key: impl Into<String>) -> Self {
        self.rule(key, FieldRule::Skip)
    }

    /// Set a raw rule for `key`.
    pub fn rule(mut self, key: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.insert(key, rule);
        self
    }

    /// The rule for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&FieldRule> {
        self.rules.get(key)
    }

    /// The effective strategy and validator for `key`.
    ///
    /// Fields without a rule, or with [`FieldRule::Skip`], validate on submit
    /// with the identity validator.
    pub fn field_config(
        &self,
        key: &str,
        default: ValidationStrategy,
    ) -> (ValidationStrategy, Option<Validator<Value, Value>>) {
        match self.rules.get(key) {
            Some(rule) => (rule.strategy(default), rule.validator().cloned()),
            None => (ValidationStrategy::OnSubmit, None),
        }
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<(String, FieldRule)> for ValidationSchema {
    fn from_iter<I: IntoIterator<Item = (String, FieldRule)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator;

    #[tokio::test]
    async fn test_lift_reports_type_mismatch() {
        let lifted = lift("age", validator::min(18i64, "Too young"));

        assert_eq!(lifted.validate(Value::Int(20)).await, Ok(Value::Int(20)));
        assert_eq!(
            lifted.validate(Value::from("x")).await,
            Err(ErrorList::new(
                "Field 'age' type mismatch: expected int, got string"
            ))
        );
    }

    #[test]
    fn test_field_config() {
        let schema = ValidationSchema::new()
            .field("name", validator::non_blank("Required"))
            .field_with("email", ValidationStrategy::OnBlur, validator::email("Invalid"))
            .skip("notes");

        let (strategy, validator) = schema.field_config("name", ValidationStrategy::OnChange);
        assert_eq!(strategy, ValidationStrategy::OnChange);
        assert!(validator.is_some());

        let (strategy, _) = schema.field_config("email", ValidationStrategy::OnChange);
        assert_eq!(strategy, ValidationStrategy::OnBlur);

        for key in ["notes", "unknown"] {
            let (strategy, validator) = schema.field_config(key, ValidationStrategy::OnChange);
            assert_eq!(strategy, ValidationStrategy::OnSubmit);
            assert!(validator.is_none());
        }
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: ValidationStrategy = serde_json::from_str(r#""on_blur""#).unwrap();
        assert_eq!(strategy, ValidationStrategy::OnBlur);
        assert_eq!(ValidationStrategy::default(), ValidationStrategy::OnSubmit);
    }
}
