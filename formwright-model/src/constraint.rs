use crate::error::{SchemaError, SchemaResult};
use regex_lite::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type CustomCheck = dyn Fn(&Value) -> bool + Send + Sync;

/// The test half of a [`Constraint`].
///
/// Every rule except `Required` accepts an absent (`null`) value; pair it
/// with `Required` to forbid that.
#[derive(Clone)]
pub enum Rule {
    /// Not null, not an empty string, not an empty array.
    Required,
    /// A string must contain none of the listed substrings.
    Blacklist(Vec<String>),
    /// A string must match the pattern.
    Matches(Regex),
    /// Minimum length of a string (in chars) or array.
    MinLength(usize),
    MaxLength(usize),
    Min(f64),
    Max(f64),
    Custom(Arc<CustomCheck>),
}

/// An ordered `(rule, message)` pair attached to a field.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub rule: Rule,
    pub message: String,
}

impl Constraint {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(Rule::Required, message)
    }

    pub fn blacklist<I, S>(values: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Rule::Blacklist(values.into_iter().map(Into::into).collect()), message)
    }

    pub fn matches(pattern: &str, message: impl Into<String>) -> SchemaResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(Rule::Matches(regex), message))
    }

    pub fn custom<F>(check: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(Rule::Custom(Arc::new(check)), message)
    }

    /// Returns true if `value` satisfies the rule.
    pub fn check(&self, value: &Value) -> bool {
        match (&self.rule, value) {
            (Rule::Required, Value::Null) => false,
            (Rule::Required, Value::String(s)) => !s.is_empty(),
            (Rule::Required, Value::Array(items)) => !items.is_empty(),
            (Rule::Required, _) => true,
            (Rule::Custom(check), v) => check(v),
            (_, Value::Null) => true,
            (Rule::Blacklist(banned), Value::String(s)) => !banned.iter().any(|b| s.contains(b.as_str())),
            (Rule::Matches(regex), Value::String(s)) => regex.is_match(s),
            (Rule::MinLength(min), v) => length(v).is_none_or(|len| len >= *min),
            (Rule::MaxLength(max), v) => length(v).is_none_or(|len| len <= *max),
            (Rule::Min(min), Value::Number(n)) => n.as_f64().is_none_or(|n| n >= *min),
            (Rule::Max(max), Value::Number(n)) => n.as_f64().is_none_or(|n| n <= *max),
            _ => true,
        }
    }
}

fn length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => f.write_str("Required"),
            Rule::Blacklist(values) => f.debug_tuple("Blacklist").field(values).finish(),
            Rule::Matches(regex) => f.debug_tuple("Matches").field(&regex.as_str()).finish(),
            Rule::MinLength(n) => f.debug_tuple("MinLength").field(n).finish(),
            Rule::MaxLength(n) => f.debug_tuple("MaxLength").field(n).finish(),
            Rule::Min(n) => f.debug_tuple("Min").field(n).finish(),
            Rule::Max(n) => f.debug_tuple("Max").field(n).finish(),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
