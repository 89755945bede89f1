//! GraphQL SDL bridge for Formwright.
//!
//! Converts between SDL text and [`TypeModel`], a JSON-friendly model of type
//! definitions that forms can edit:
//! - [`parse`] / [`serialize`]: the in-process conversion, with
//!   `parse(serialize(m)) == m` for every printable model
//! - [`SdlService`]: async seam for running the conversion elsewhere
//! - [`SchemaEditor`]: type/field editing state and the field form used by
//!   the schema side view

mod editor;
mod error;
mod lexer;
mod model;
mod parser;
mod printer;
mod service;

pub use editor::{directive_flow, SchemaEditor, Selection, BUILTIN_SCALARS, DIRECTIVES};
pub use error::{SdlError, SdlResult};
pub use model::{
    is_valid_name, ArgumentDefinition, Directive, EnumValue, FieldDefinition, TypeDefinition, TypeKind, TypeModel,
    TypeRef,
};
pub use parser::parse;
pub use printer::serialize;
pub use service::{LocalSdlService, SdlService};
