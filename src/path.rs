use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// One step of a dot-separated field path.
///
/// A token that parses as a non-negative integer always becomes an `Index`;
/// an object field literally named `"0"` is indistinguishable from index 0 in
/// the path syntax. Traversal compensates by letting an `Index` fall back to
/// the decimal string key when it lands on an object (see `Value::resolve`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    Field(String),
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, "{}", name),
            Segment::Index(i) => write!(f, "{}", i),
        }
    }
}

/// An ordered sequence of path segments.
///
/// Paths produced by [`Path::parse`] always have at least one segment. The
/// empty path exists only internally and denotes the current root (fan-out
/// with an exhausted tail compares array elements directly).
///
/// There is no escaping of literal dots: a field name containing a `.` cannot
/// be addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Split a dot-separated path string into segments.
    pub fn parse(input: &str) -> Result<Path, CompileError> {
        if input.is_empty() {
            return Err(CompileError::EmptyPath);
        }
        let segments = input
            .split('.')
            .map(|token| match token.parse::<usize>() {
                Ok(index) => Segment::Index(index),
                Err(_) => Segment::Field(token.to_string()),
            })
            .collect();
        Ok(Path { segments })
    }

    pub(crate) fn from_segments(segments: &[Segment]) -> Path { Path { segments: segments.to_vec() } }

    pub fn segments(&self) -> &[Segment] { &self.segments }

    pub fn len(&self) -> usize { self.segments.len() }

    pub fn is_empty(&self) -> bool { self.segments.is_empty() }
}

impl fmt::Display for Path {
    /// Renders document-relative: `doc` for the root, `doc.foo.0` otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc")?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}
