//! Form orchestrators.
//!
//! An orchestrator owns one or more stores, wires field-level validation to
//! each field's [`ValidationStrategy`](crate::schema::ValidationStrategy) and
//! drives submission:
//!
//! - [`Form`]: a single flat form.
//! - [`FieldArray`]: a dynamic list of groups sharing one schema.
//! - [`CompositeForm`]: a flat form plus named field arrays, submitted
//!   together.
//!
//! Field-level validations run on the tokio runtime; the binding layer reads
//! [`FieldProps`] snapshots and calls back into the orchestrator.

mod composite;
mod config;
mod field_array;
mod props;
mod single;
mod submit;

pub use composite::{CompositeErrors, CompositeForm};
pub use config::{
    CompositeConfig, CompositeFieldArraySchemaFactory, CompositeSchemaFactory, CompositeValues,
    FieldArrayConfig, FieldArraySchemaFactory, FormConfig, SchemaFactory,
};
pub use field_array::FieldArray;
pub use props::{FieldGroup, FieldProps, ValidationTask};
pub use single::Form;
pub use submit::{SubmitHandler, SubmitOutcome};
