//! Dot/bracket addresses into a configuration value.
//!
//! `mtlsConfig.mtls` addresses a nested mapping key, `targets[2].hostname` a
//! key inside the third element of an array. The empty string is the root.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// A mapping key.
    Key(String),
    /// A position in an array.
    Index(usize),
}

impl Segment {
    /// Returns the key if this is a key segment.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k),
            Segment::Index(_) => None,
        }
    }

    /// Returns the index if this is an index segment.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Key(_) => None,
            Segment::Index(i) => Some(*i),
        }
    }
}

/// A parsed path into a configuration value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// The empty path, addressing the whole value.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from raw segments.
    #[must_use]
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Parses a dot/bracket path such as `a.b[2].c`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPath {
            path: s.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut key = String::new();
        let mut after_index = false;
        let mut dot_pending = false;
        let mut chars = s.chars();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    } else if !after_index {
                        return Err(invalid("empty key"));
                    }
                    after_index = false;
                    dot_pending = true;
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    } else if dot_pending {
                        return Err(invalid("empty key before '['"));
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) if d.is_ascii_digit() => digits.push(d),
                            Some(_) => return Err(invalid("index must be a non-negative integer")),
                            None => return Err(invalid("unclosed '['")),
                        }
                    }
                    if digits.is_empty() {
                        return Err(invalid("empty index"));
                    }
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| invalid("index out of range"))?;
                    segments.push(Segment::Index(index));
                    after_index = true;
                    dot_pending = false;
                }
                ']' => return Err(invalid("unexpected ']'")),
                c => {
                    if after_index {
                        return Err(invalid("expected '.' or '[' after an index"));
                    }
                    key.push(c);
                    dot_pending = false;
                }
            }
        }

        if dot_pending {
            return Err(invalid("trailing '.'"));
        }
        if !key.is_empty() {
            segments.push(Segment::Key(key));
        }
        Ok(Self(segments))
    }

    /// Returns true for the empty path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Returns the last segment, if any.
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Returns the path without its last segment (`None` for the root).
    pub fn parent(&self) -> Option<FieldPath> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Appends a single key segment.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.into()));
        Self(segments)
    }

    /// Appends an index segment.
    #[must_use]
    pub fn index(&self, index: usize) -> FieldPath {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    /// Concatenates two paths.
    #[must_use]
    pub fn join(&self, other: &FieldPath) -> FieldPath {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// Returns true if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns the remainder after `prefix`, if `prefix` is a prefix.
    pub fn strip_prefix(&self, prefix: &FieldPath) -> Option<FieldPath> {
        self.0
            .strip_prefix(prefix.0.as_slice())
            .map(|rest| Self(rest.to_vec()))
    }

    /// The path with all indices dropped, e.g. `targets.hostname` for
    /// `targets[3].hostname`. Identifies the declaring schema location.
    pub fn schema_key(&self) -> String {
        self.0
            .iter()
            .filter_map(Segment::as_key)
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(k) if i == 0 => write!(f, "{k}")?,
                Segment::Key(k) => write!(f, ".{k}")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl TryFrom<&str> for FieldPath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}
