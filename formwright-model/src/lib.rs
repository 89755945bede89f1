//! Schema model for Formwright.
//!
//! Defines the declarative description of a form that every other crate
//! consumes:
//! - [`FieldSchema`]: one field with its kind, nested form, default, visibility,
//!   constraints, after-change hook, presentation metadata
//! - [`Schema`] / [`SubForm`]: ordered field declarations plus the [`Flow`]
//!   that decides which keys are shown and in what order
//! - [`Visibility`]: a small predicate language evaluated against the value
//! - [`Constraint`]: ordered `(rule, message)` validation pairs
//! - [`FieldDescriptor`] / [`PluginDescriptor`]: the JSON wire form a backend
//!   sends, convertible into the model above
//!
//! Nothing in this crate evaluates a form against a value; that is the job
//! of `formwright-form`.

mod constraint;
mod descriptor;
mod error;
mod field;
mod flow;
mod hooks;
mod schema;
mod visibility;

pub use constraint::{Constraint, Rule};
pub use descriptor::{FieldDescriptor, FieldProps, FlowEntry, PluginDescriptor};
pub use error::{HookError, PredicateError, SchemaError, SchemaResult, ValidationError};
pub use field::{DefaultValue, FieldKind, FieldSchema, SelectOption};
pub use flow::{Flow, FlowContext};
pub use hooks::{AfterChangeHook, FieldAccess};
pub use schema::{Schema, SubForm};
pub use visibility::Visibility;
