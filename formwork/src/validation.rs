//! Whole-record validation: forms, field arrays and composite field arrays.
//!
//! Every function here validates its parts concurrently and reports failures
//! in the shape of the input, with `None` at every position that passed.

use futures::future::join_all;

use crate::model::{FieldMap, Value, Values};
use crate::result::ErrorList;
use crate::schema::ValidationSchema;

/// Per-field errors of a form; `None` for fields that passed.
pub type FormErrors = FieldMap<Option<ErrorList>>;

/// Per-group errors of a field array; `None` for groups that passed.
pub type FieldArrayErrors = Vec<Option<FormErrors>>;

/// Per-array errors of a composite form; `None` for arrays that passed.
pub type CompositeFieldArrayErrors = FieldMap<Option<FieldArrayErrors>>;

/// Validate every field of `values` against `schema`.
///
/// All schema fields are validated concurrently. A schema key missing from
/// `values` is validated against [`Value::Null`]; value keys not named by the
/// schema pass through unchanged. On success the returned values reflect any
/// transformations the validators applied.
pub async fn validate_form(
    values: &Values,
    schema: &ValidationSchema,
) -> Result<Values, FormErrors> {
    let pending = schema.iter().map(|(key, rule)| {
        let value = values.get(key).cloned().unwrap_or(Value::Null);
        let validator = rule.validator().cloned();
        async move {
            match validator {
                Some(validator) => validator.validate(value).await,
                None => Ok(value),
            }
        }
    });
    let results = join_all(pending).await;

    let mut validated = Values::with_capacity(values.len());
    let mut errors = FormErrors::with_capacity(values.len());
    let mut failed = false;

    for ((key, _), result) in schema.iter().zip(results) {
        match result {
            Ok(value) => {
                validated.insert(key, value);
                errors.insert(key, None);
            }
            Err(list) => {
                failed = true;
                errors.insert(key, Some(list));
            }
        }
    }

    for (key, value) in values.iter() {
        if schema.get(key).is_none() {
            validated.insert(key, value.clone());
            errors.insert(key, None);
        }
    }

    if failed {
        log::debug!(
            "form validation failed for {} field(s)",
            errors.values().filter(|e| e.is_some()).count()
        );
        Err(errors)
    } else {
        Ok(validated)
    }
}

/// Validate every group of a field array against the same schema.
///
/// Succeeds only when every group passes. The error vector has one entry
/// per group.
pub async fn validate_field_array(
    values: &[Values],
    schema: &ValidationSchema,
) -> Result<Vec<Values>, FieldArrayErrors> {
    let results = join_all(values.iter().map(|group| validate_form(group, schema))).await;

    if results.iter().all(Result::is_ok) {
        Ok(results.into_iter().flatten().collect())
    } else {
        Err(results.into_iter().map(Result::err).collect())
    }
}

/// Validate several named field arrays, each against its own schema.
///
/// An array without a schema passes through unchanged.
pub async fn validate_composite_field_array(
    values: &FieldMap<Vec<Values>>,
    schemas: &FieldMap<ValidationSchema>,
) -> Result<FieldMap<Vec<Values>>, CompositeFieldArrayErrors> {
    let pending = values.iter().map(|(key, groups)| async move {
        match schemas.get(key) {
            Some(schema) => validate_field_array(groups, schema).await,
            None => Ok(groups.clone()),
        }
    });
    let results = join_all(pending).await;

    if results.iter().all(Result::is_ok) {
        Ok(values
            .keys()
            .zip(results.into_iter().flatten())
            .collect())
    } else {
        Err(values
            .keys()
            .zip(results.into_iter().map(Result::err))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator;

    fn schema() -> ValidationSchema {
        ValidationSchema::new()
            .field("name", validator::non_blank("Required"))
            .field("age", validator::min(18i64, "Too young"))
    }

    #[tokio::test]
    async fn test_validate_form_success_applies_transforms() {
        let values = Values::new().with("name", "  Ada ").with("age", 36i64);
        let validated = validate_form(&values, &schema()).await.unwrap();
        assert_eq!(validated.get("name"), Some(&Value::from("Ada")));
        assert_eq!(validated.get("age"), Some(&Value::Int(36)));
    }

    #[tokio::test]
    async fn test_validate_form_reports_every_field() {
        let values = Values::new().with("name", " ").with("age", 36i64);
        let errors = validate_form(&values, &schema()).await.unwrap_err();

        assert_eq!(errors.get("name"), Some(&Some(ErrorList::new("Required"))));
        assert_eq!(errors.get("age"), Some(&None));
    }

    #[tokio::test]
    async fn test_validate_form_missing_and_extra_keys() {
        let schema = ValidationSchema::new()
            .field("nickname", validator::defined::<String>("Required"));
        let values = Values::new().with("notes", "free text");

        let errors = validate_form(&values, &schema).await.unwrap_err();
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["nickname", "notes"]);
        assert_eq!(errors.get("nickname"), Some(&Some(ErrorList::new("Required"))));

        let values = values.with("nickname", "ada");
        let validated = validate_form(&values, &schema).await.unwrap();
        assert_eq!(validated.get("notes"), Some(&Value::from("free text")));
    }

    #[tokio::test]
    async fn test_empty_inputs_pass() {
        let validated = validate_form(&Values::new(), &ValidationSchema::new()).await;
        assert_eq!(validated, Ok(Values::new()));
        assert_eq!(validate_field_array(&[], &schema()).await, Ok(Vec::new()));
    }

    #[tokio::test]
    async fn test_field_array_is_all_or_nothing() {
        let groups = vec![
            Values::new().with("name", "Ada").with("age", 36i64),
            Values::new().with("name", "").with("age", 36i64),
        ];

        let errors = validate_field_array(&groups, &schema()).await.unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].is_none());
        assert_eq!(
            errors[1].as_ref().and_then(|e| e.get("name").cloned()),
            Some(Some(ErrorList::new("Required")))
        );
    }

    #[tokio::test]
    async fn test_composite_without_schema_passes_through() {
        let values: FieldMap<Vec<Values>> = FieldMap::new()
            .with("people", vec![Values::new().with("name", "")])
            .with("tags", vec![Values::new().with("label", "x")]);
        let schemas: FieldMap<ValidationSchema> = FieldMap::new().with("people", schema());

        let errors = validate_composite_field_array(&values, &schemas)
            .await
            .unwrap_err();
        assert!(matches!(errors.get("people"), Some(Some(groups)) if groups.len() == 1));
        assert_eq!(errors.get("tags"), Some(&None));

        let people = vec![Values::new().with("name", "Ada").with("age", 20i64)];
        let values = values.with("people", people);
        let validated = validate_composite_field_array(&values, &schemas).await.unwrap();
        assert_eq!(validated.get("tags"), values.get("tags"));
    }
}
