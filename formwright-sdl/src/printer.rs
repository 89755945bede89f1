//! Writes a [`TypeModel`] back out as SDL text.

use crate::error::{SdlError, SdlResult};
use crate::model::{
    is_valid_name, ArgumentDefinition, Directive, FieldDefinition, TypeDefinition, TypeKind, TypeModel, TypeRef,
};
use serde_json::Value;
use std::fmt::Write;

const INDENT: &str = "  ";

/// Prints `model` as an SDL document, one definition per block.
///
/// Values that would not survive a GraphQL literal unchanged (objects,
/// arrays, strings that look like JSON) are written as JSON-encoded string
/// literals; the parser decodes them back.
pub fn serialize(model: &TypeModel) -> SdlResult<String> {
    let blocks = model
        .types
        .iter()
        .map(print_type)
        .collect::<SdlResult<Vec<_>>>()?;
    let mut out = blocks.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

fn fail(element: &str, reason: impl Into<String>) -> SdlError {
    SdlError::Print {
        element: element.to_string(),
        reason: reason.into(),
    }
}

fn check_name(name: &str) -> SdlResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(SdlError::InvalidName(name.to_string()))
    }
}

fn print_type(definition: &TypeDefinition) -> SdlResult<String> {
    let name = definition.name.as_str();
    check_name(name)?;

    match definition.kind {
        TypeKind::Enum => {
            if definition.values.is_empty() {
                return Err(fail(name, "an enum needs at least one value"));
            }
            if !definition.fields.is_empty() {
                return Err(fail(name, "an enum cannot have fields"));
            }
        }
        TypeKind::Scalar => {
            if !definition.fields.is_empty() || !definition.values.is_empty() {
                return Err(fail(name, "a scalar cannot have fields or values"));
            }
        }
        _ => {
            if !definition.values.is_empty() {
                return Err(fail(name, "only enums can have values"));
            }
        }
    }
    if !definition.implements.is_empty() && !matches!(definition.kind, TypeKind::Object | TypeKind::Interface) {
        return Err(fail(name, "only object types and interfaces can implement interfaces"));
    }

    let mut out = String::new();
    if let Some(description) = &definition.description {
        out.push_str(&string_literal(description));
        out.push('\n');
    }
    let _ = write!(out, "{} {name}", definition.kind.keyword());
    if !definition.implements.is_empty() {
        for interface in &definition.implements {
            check_name(interface)?;
        }
        let _ = write!(out, " implements {}", definition.implements.join(" & "));
    }
    out.push_str(&print_directives(&definition.directives)?);

    let mut lines = Vec::new();
    if definition.kind == TypeKind::Enum {
        for value in &definition.values {
            check_name(&value.name)?;
            if matches!(value.name.as_str(), "true" | "false" | "null") {
                return Err(fail(&value.name, "reserved word used as an enum value"));
            }
            if let Some(description) = &value.description {
                lines.push(format!("{INDENT}{}", string_literal(description)));
            }
            lines.push(format!("{INDENT}{}{}", value.name, print_directives(&value.directives)?));
        }
    } else {
        for field in &definition.fields {
            if let Some(description) = &field.description {
                lines.push(format!("{INDENT}{}", string_literal(description)));
            }
            lines.push(format!("{INDENT}{}", print_field(definition, field)?));
        }
    }

    if !lines.is_empty() {
        out.push_str(" {\n");
        out.push_str(&lines.join("\n"));
        out.push_str("\n}");
    }
    Ok(out)
}

fn print_field(owner: &TypeDefinition, field: &FieldDefinition) -> SdlResult<String> {
    check_name(&field.name)?;
    let element = format!("{}.{}", owner.name, field.name);
    if owner.kind == TypeKind::Input && !field.arguments.is_empty() {
        return Err(fail(&element, "input fields cannot take arguments"));
    }
    if owner.kind != TypeKind::Input && field.default_value.is_some() {
        return Err(fail(&element, "only input fields can have a default value"));
    }

    let mut out = field.name.clone();
    if !field.arguments.is_empty() {
        let arguments = field
            .arguments
            .iter()
            .map(print_argument)
            .collect::<SdlResult<Vec<_>>>()?;
        let _ = write!(out, "({})", arguments.join(", "));
    }
    let _ = write!(out, ": {}", print_type_ref(&field.field_type)?);
    if let Some(default) = &field.default_value {
        let _ = write!(out, " = {}", print_value(default));
    }
    out.push_str(&print_directives(&field.directives)?);
    Ok(out)
}

fn print_argument(argument: &ArgumentDefinition) -> SdlResult<String> {
    check_name(&argument.name)?;
    let mut out = String::new();
    if let Some(description) = &argument.description {
        out.push_str(&string_literal(description));
        out.push(' ');
    }
    let _ = write!(out, "{}: {}", argument.name, print_type_ref(&argument.value_type)?);
    if let Some(default) = &argument.default_value {
        let _ = write!(out, " = {}", print_value(default));
    }
    out.push_str(&print_directives(&argument.directives)?);
    Ok(out)
}

fn print_type_ref(type_ref: &TypeRef) -> SdlResult<String> {
    check_name(&type_ref.name)?;
    let mut out = if type_ref.is_list {
        format!("[{}{}]", type_ref.name, if type_ref.item_required { "!" } else { "" })
    } else {
        type_ref.name.clone()
    };
    if type_ref.required {
        out.push('!');
    }
    Ok(out)
}

fn print_directives(directives: &[Directive]) -> SdlResult<String> {
    let mut out = String::new();
    for directive in directives {
        check_name(&directive.name)?;
        let _ = write!(out, " @{}", directive.name);
        if !directive.arguments.is_empty() {
            let mut arguments = Vec::with_capacity(directive.arguments.len());
            for (name, value) in &directive.arguments {
                check_name(name)?;
                arguments.push(format!("{name}: {}", print_value(value)));
            }
            let _ = write!(out, "({})", arguments.join(", "));
        }
    }
    Ok(out)
}

fn print_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if serde_json::from_str::<Value>(s).is_ok() {
                string_literal(&Value::String(s.clone()).to_string())
            } else {
                string_literal(s)
            }
        }
        Value::Array(_) | Value::Object(_) => string_literal(&value.to_string()),
    }
}

/// Escapes `s` as a single-line GraphQL string literal.
fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
