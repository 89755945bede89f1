//! Recursive-descent reader for the supported SDL subset.

use crate::error::{SdlError, SdlResult};
use crate::lexer::{tokenize, Tok, Token};
use crate::model::{
    ArgumentDefinition, Directive, EnumValue, FieldDefinition, TypeDefinition, TypeKind, TypeModel, TypeRef,
};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

/// Parses an SDL document into a [`TypeModel`].
///
/// Type extensions, unions, schema and directive definitions are rejected
/// with [`SdlError::Unsupported`].
pub fn parse(sdl: &str) -> SdlResult<TypeModel> {
    let tokens = tokenize(sdl)?;
    let mut parser = Parser { tokens, pos: 0 };
    let model = parser.document()?;
    tracing::debug!(types = model.types.len(), "parsed SDL document");
    Ok(model)
}

/// Decodes the content of a string literal used as a value.
///
/// Content that is itself JSON is decoded, anything else stays a string.
pub(crate) fn decode_string_value(content: &str) -> Value {
    serde_json::from_str(content).unwrap_or_else(|_| Value::String(content.to_string()))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token list always ends with Eof, and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_second(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.tok != Tok::Eof {
            self.pos += 1;
        }
        token
    }

    fn at_punct(&self, c: char) -> bool {
        self.peek().tok == Tok::Punct(c)
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.at_punct(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error_here(&self, message: impl Into<String>) -> SdlError {
        let token = self.peek();
        SdlError::syntax(token.line, token.column, message)
    }

    fn unsupported(token: &Token, what: impl Into<String>) -> SdlError {
        SdlError::Unsupported {
            line: token.line,
            column: token.column,
            what: what.into(),
        }
    }

    fn expect_punct(&mut self, c: char) -> SdlResult<()> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected '{c}', found {}", describe(&self.peek().tok))))
        }
    }

    fn expect_name(&mut self) -> SdlResult<String> {
        match &self.peek().tok {
            Tok::Name(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => Err(self.error_here(format!("expected a name, found {}", describe(other)))),
        }
    }

    fn description(&mut self) -> Option<String> {
        if let Tok::Str { value, .. } = &self.peek().tok {
            let value = value.clone();
            self.advance();
            Some(value)
        } else {
            None
        }
    }

    fn document(&mut self) -> SdlResult<TypeModel> {
        let mut model = TypeModel::default();
        loop {
            let description = self.description();
            let token = self.peek().clone();
            let keyword = match &token.tok {
                Tok::Eof if description.is_none() => return Ok(model),
                Tok::Name(keyword) => keyword.clone(),
                other => {
                    return Err(self.error_here(format!("expected a type definition, found {}", describe(other))))
                }
            };
            let kind = match keyword.as_str() {
                "type" => TypeKind::Object,
                "input" => TypeKind::Input,
                "interface" => TypeKind::Interface,
                "enum" => TypeKind::Enum,
                "scalar" => TypeKind::Scalar,
                "union" | "schema" | "extend" => {
                    return Err(Self::unsupported(&token, format!("'{keyword}' definitions")))
                }
                "directive" => return Err(Self::unsupported(&token, "directive definitions")),
                other => return Err(self.error_here(format!("unknown definition '{other}'"))),
            };
            self.advance();
            let mut definition = self.type_definition(kind)?;
            definition.description = description;
            model.types.push(definition);
        }
    }

    fn type_definition(&mut self, kind: TypeKind) -> SdlResult<TypeDefinition> {
        let name = self.expect_name()?;
        let mut definition = TypeDefinition {
            name,
            kind,
            ..TypeDefinition::default()
        };

        if matches!(kind, TypeKind::Object | TypeKind::Interface)
            && matches!(&self.peek().tok, Tok::Name(n) if n == "implements")
        {
            self.advance();
            self.eat_punct('&');
            definition.implements.push(self.expect_name()?);
            while self.eat_punct('&') {
                definition.implements.push(self.expect_name()?);
            }
            // Legacy space-separated interface lists.
            while matches!(&self.peek().tok, Tok::Name(_)) && !self.starts_definition() {
                definition.implements.push(self.expect_name()?);
            }
        }

        definition.directives = self.directives()?;

        match kind {
            TypeKind::Scalar => {}
            TypeKind::Enum => {
                if self.eat_punct('{') {
                    while !self.eat_punct('}') {
                        definition.values.push(self.enum_value()?);
                    }
                }
            }
            _ => {
                if self.eat_punct('{') {
                    while !self.eat_punct('}') {
                        definition.fields.push(self.field(kind)?);
                    }
                }
            }
        }
        Ok(definition)
    }

    /// Whether the upcoming tokens begin the next top-level definition.
    fn starts_definition(&self) -> bool {
        match &self.peek().tok {
            Tok::Name(n) => {
                matches!(
                    n.as_str(),
                    "type" | "input" | "interface" | "enum" | "scalar" | "union" | "schema" | "extend" | "directive"
                ) && matches!(self.peek_second().tok, Tok::Name(_))
            }
            _ => false,
        }
    }

    fn enum_value(&mut self) -> SdlResult<EnumValue> {
        let description = self.description();
        let token = self.peek().clone();
        let name = self.expect_name()?;
        if matches!(name.as_str(), "true" | "false" | "null") {
            return Err(SdlError::syntax(
                token.line,
                token.column,
                format!("'{name}' cannot be an enum value"),
            ));
        }
        Ok(EnumValue {
            name,
            description,
            directives: self.directives()?,
        })
    }

    fn field(&mut self, kind: TypeKind) -> SdlResult<FieldDefinition> {
        let description = self.description();
        let name = self.expect_name()?;
        let arguments = if self.at_punct('(') {
            if kind == TypeKind::Input {
                return Err(self.error_here("input fields cannot take arguments"));
            }
            self.arguments()?
        } else {
            Vec::new()
        };
        self.expect_punct(':')?;
        let field_type = self.type_ref()?;
        let default_value = if self.eat_punct('=') {
            if kind != TypeKind::Input {
                return Err(self.error_here("only input fields can have a default value"));
            }
            Some(self.value()?)
        } else {
            None
        };
        Ok(FieldDefinition {
            name,
            description,
            field_type,
            arguments,
            directives: self.directives()?,
            default_value,
        })
    }

    fn arguments(&mut self) -> SdlResult<Vec<ArgumentDefinition>> {
        self.expect_punct('(')?;
        let mut arguments = Vec::new();
        while !self.eat_punct(')') {
            let description = self.description();
            let name = self.expect_name()?;
            self.expect_punct(':')?;
            let value_type = self.type_ref()?;
            let default_value = if self.eat_punct('=') {
                Some(self.value()?)
            } else {
                None
            };
            arguments.push(ArgumentDefinition {
                name,
                description,
                value_type,
                default_value,
                directives: self.directives()?,
            });
        }
        Ok(arguments)
    }

    fn type_ref(&mut self) -> SdlResult<TypeRef> {
        if self.at_punct('[') {
            self.advance();
            if self.at_punct('[') {
                return Err(Self::unsupported(self.peek(), "nested list types"));
            }
            let name = self.expect_name()?;
            let item_required = self.eat_punct('!');
            self.expect_punct(']')?;
            let required = self.eat_punct('!');
            Ok(TypeRef {
                name,
                required,
                is_list: true,
                item_required,
            })
        } else {
            let name = self.expect_name()?;
            let required = self.eat_punct('!');
            Ok(TypeRef {
                name,
                required,
                is_list: false,
                item_required: false,
            })
        }
    }

    fn directives(&mut self) -> SdlResult<Vec<Directive>> {
        let mut directives = Vec::new();
        while self.eat_punct('@') {
            let name = self.expect_name()?;
            let mut arguments = IndexMap::new();
            if self.eat_punct('(') {
                while !self.eat_punct(')') {
                    let arg = self.expect_name()?;
                    self.expect_punct(':')?;
                    let value = self.value()?;
                    arguments.insert(arg, value);
                }
            }
            directives.push(Directive { name, arguments });
        }
        Ok(directives)
    }

    fn value(&mut self) -> SdlResult<Value> {
        let token = self.advance();
        match token.tok {
            Tok::Int(text) => int_value(&text)
                .ok_or_else(|| SdlError::syntax(token.line, token.column, format!("integer '{text}' is out of range"))),
            Tok::Float(text) => text
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| SdlError::syntax(token.line, token.column, format!("invalid float '{text}'"))),
            Tok::Str { value, .. } => Ok(decode_string_value(&value)),
            Tok::Name(name) => Ok(match name.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                "null" => Value::Null,
                _ => Value::String(name),
            }),
            Tok::Punct('[') => {
                let mut items = Vec::new();
                while !self.eat_punct(']') {
                    if self.peek().tok == Tok::Eof {
                        return Err(self.error_here("unterminated list value"));
                    }
                    items.push(self.value()?);
                }
                Ok(Value::Array(items))
            }
            Tok::Punct('{') => {
                let mut map = Map::new();
                while !self.eat_punct('}') {
                    let key = self.expect_name()?;
                    self.expect_punct(':')?;
                    map.insert(key, self.value()?);
                }
                Ok(Value::Object(map))
            }
            Tok::Punct('$') => Err(SdlError::syntax(
                token.line,
                token.column,
                "variables are not allowed in constant values",
            )),
            other => Err(SdlError::syntax(
                token.line,
                token.column,
                format!("expected a value, found {}", describe(&other)),
            )),
        }
    }
}

/// `None` when the literal does not fit even an `f64`.
fn int_value(text: &str) -> Option<Value> {
    if let Ok(n) = text.parse::<i64>() {
        Some(Value::from(n))
    } else if let Ok(n) = text.parse::<u64>() {
        Some(Value::from(n))
    } else {
        text.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
    }
}

fn describe(tok: &Tok) -> String {
    match tok {
        Tok::Name(name) => format!("'{name}'"),
        Tok::Int(text) | Tok::Float(text) => format!("number {text}"),
        Tok::Str { .. } => "a string".to_string(),
        Tok::Punct(c) => format!("'{c}'"),
        Tok::Spread => "'...'".to_string(),
        Tok::Eof => "end of input".to_string(),
    }
}
