//! Form state and validation engine
//!
//! Composable asynchronous validators, whole-form validation, per-field state
//! stores and the orchestrators that tie them together with field-level
//! validation strategies and submission.

pub mod error;
pub mod form;
pub mod model;
pub mod result;
pub mod schema;
pub mod state;
pub mod validation;
pub mod validator;

pub mod prelude {
    pub use crate::error::{FieldError, SubmitError};
    pub use crate::form::{
        CompositeConfig, CompositeErrors, CompositeForm, CompositeValues, FieldArray,
        FieldArrayConfig, FieldGroup, FieldProps, Form, FormConfig, SubmitHandler, SubmitOutcome,
    };
    pub use crate::model::{FieldMap, FromValue, Value, Values};
    pub use crate::result::{ErrorList, ResultExt, Validated};
    pub use crate::schema::{FieldRule, ValidationSchema, ValidationStrategy};
    pub use crate::state::{FieldArrayStore, FieldState, FormStore, Toggle};
    pub use crate::validation::{
        FieldArrayErrors, FormErrors, validate_composite_field_array, validate_field_array,
        validate_form,
    };
    pub use crate::validator::{self, Validator};
    pub use crate::{parallel, sequence};
}
