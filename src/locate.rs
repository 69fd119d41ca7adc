//! Source positions for decode diagnostics.
//!
//! `serde_yaml::Value` trees carry no marks, so a node is identified by its
//! key path from the document root. The source line is recovered on demand by
//! walking that path through the block-style layout of the original text.

use std::fmt;

use serde_yaml::Value;

/// Where a node sits in the document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub path: Vec<String>,
    /// 1-based source line, when it could be found.
    pub line: Option<usize>,
}

impl Position {
    pub fn new(path: Vec<String>, line: Option<usize>) -> Self {
        Self { path, line }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>")?;
        } else {
            write!(f, "{}", self.path.join("."))?;
        }
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        Ok(())
    }
}

/// Kind of a YAML node, for "expected X, found Y" messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Mapping,
    Tagged,
}

impl NodeKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Sequence(_) => Self::Sequence,
            Value::Mapping(_) => Self::Mapping,
            Value::Tagged(_) => Self::Tagged,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Tagged => "tagged value",
        };
        f.write_str(s)
    }
}

/// Find the line of the node at `path`.
///
/// Returns the line of the deepest key on the path that can be found, so a
/// node written in flow style (`f: {type: relation, to: a/b}`) resolves to
/// the line of its enclosing key.
pub fn locate(source: &str, path: &[String]) -> Option<usize> {
    if path.is_empty() {
        return None;
    }

    let mut depth = 0;
    let mut parent_indent: Option<usize> = None;
    // Indent of the direct children of the current block, set by its first key.
    let mut child_indent: Option<usize> = None;
    let mut found = None;

    for (idx, raw) in source.lines().enumerate() {
        let Some((indent, key)) = split_key(raw) else {
            continue;
        };

        if let Some(parent) = parent_indent {
            if indent <= parent {
                // Left the block of the last matched key.
                break;
            }
        }

        let level = *child_indent.get_or_insert(indent);
        if indent != level {
            continue;
        }

        if key == path[depth] {
            found = Some(idx + 1);
            parent_indent = Some(indent);
            child_indent = None;
            depth += 1;
            if depth == path.len() {
                break;
            }
        }
    }

    found
}

/// Split a block mapping line into (indent, key). Skips blanks, comments,
/// document markers and sequence items.
fn split_key(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    if trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("---")
        || trimmed.starts_with("...")
        || trimmed.starts_with('-')
    {
        return None;
    }
    let indent = line.len() - trimmed.len();

    let key = if let Some(rest) = trimmed.strip_prefix('"') {
        &rest[..rest.find('"')?]
    } else if let Some(rest) = trimmed.strip_prefix('\'') {
        &rest[..rest.find('\'')?]
    } else {
        let end = trimmed.find(": ").or_else(|| {
            trimmed
                .ends_with(':')
                .then(|| trimmed.len() - 1)
        })?;
        trimmed[..end].trim_end()
    };

    Some((indent, key))
}
