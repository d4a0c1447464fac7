//! Test titles and the two values derived from them: the category that
//! routes a result to its output file, and the camel-case identifier the
//! grader uses as the method name.
//!
//! Both derivations work on the joined title split on single spaces, so
//! `["TS-1", "Boundary", "returns correct sum"]` yields category
//! [`Category::Boundary`] and identifier `ts-1BoundaryReturnsCorrectSum`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Why a title could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("test title is empty")]
    Empty,

    #[error("test title is not a string or list of strings (got {kind})")]
    Unsupported { kind: &'static str },
}

/// Test classification used to route output lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Business,
    Boundary,
    Exception,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Business, Category::Boundary, Category::Exception];

    /// Match a title token, case-insensitively
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "business" => Some(Category::Business),
            "boundary" => Some(Category::Boundary),
            "exception" => Some(Category::Exception),
            _ => None,
        }
    }

    /// Category of a joined title: its second space-delimited token,
    /// falling back to boundary
    pub fn from_title(title: &str) -> Self {
        title
            .split(' ')
            .nth(1)
            .and_then(Category::from_token)
            .unwrap_or(Category::Boundary)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Boundary => "boundary",
            Category::Exception => "exception",
        }
    }

    /// Capitalized form written to the XML manifest
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Business => "Business",
            Category::Boundary => "Boundary",
            Category::Exception => "Exception",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title as delivered by the host, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTitle {
    Segments(Vec<String>),
    Single(String),
    Unsupported(&'static str),
}

impl RawTitle {
    /// Interpret a JSON title value.
    ///
    /// Arrays may hold strings, numbers and booleans (stringified) and nulls
    /// (empty segments). Any other shape is unsupported.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => RawTitle::Single(s.clone()),
            Value::Array(items) => {
                let mut segments = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => segments.push(s.clone()),
                        Value::Number(n) => segments.push(n.to_string()),
                        Value::Bool(b) => segments.push(b.to_string()),
                        Value::Null => segments.push(String::new()),
                        other => return RawTitle::Unsupported(json_kind(other)),
                    }
                }
                RawTitle::Segments(segments)
            }
            other => RawTitle::Unsupported(json_kind(other)),
        }
    }

    /// Join and validate
    pub fn resolve(&self) -> Result<TestTitle, TitleError> {
        let joined = match self {
            RawTitle::Segments(segments) => segments.join(" "),
            RawTitle::Single(s) => s.clone(),
            RawTitle::Unsupported(kind) => return Err(TitleError::Unsupported { kind: *kind }),
        };
        if joined.trim().is_empty() {
            return Err(TitleError::Empty);
        }
        Ok(TestTitle { joined })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl From<Vec<String>> for RawTitle {
    fn from(segments: Vec<String>) -> Self {
        RawTitle::Segments(segments)
    }
}

impl From<&[&str]> for RawTitle {
    fn from(segments: &[&str]) -> Self {
        RawTitle::Segments(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RawTitle {
    fn from(segments: [&str; N]) -> Self {
        RawTitle::Segments(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&str> for RawTitle {
    fn from(title: &str) -> Self {
        RawTitle::Single(title.to_string())
    }
}

impl From<String> for RawTitle {
    fn from(title: String) -> Self {
        RawTitle::Single(title)
    }
}

impl From<&Value> for RawTitle {
    fn from(value: &Value) -> Self {
        RawTitle::from_value(value)
    }
}

/// A validated, non-empty display title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTitle {
    joined: String,
}

impl TestTitle {
    pub fn as_str(&self) -> &str {
        &self.joined
    }

    pub fn category(&self) -> Category {
        Category::from_title(&self.joined)
    }

    pub fn identifier(&self) -> String {
        identifier(&self.joined)
    }
}

impl fmt::Display for TestTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined)
    }
}

/// Camel-case a title: first word lower-cased, later words capitalized,
/// joined without separators
pub fn identifier(title: &str) -> String {
    title
        .split(' ')
        .enumerate()
        .map(|(index, word)| {
            if index == 0 {
                word.to_lowercase()
            } else {
                capitalize(word)
            }
        })
        .collect()
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
