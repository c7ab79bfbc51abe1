//! `$`-rooted locators for diagnostics.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step in a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object member, rendered `.key`.
    Key(String),
    /// Array element, rendered `[i]`.
    Index(usize),
}

/// Location of a value inside a document, rendered like `$.items[2].name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The document root, `$`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a member of this object.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.segments.push(PathSegment::Key(key.into()));
        child
    }

    /// Path of an element of this array.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut child = self.clone();
        child.segments.push(PathSegment::Index(index));
        child
    }

    /// Push a segment in place.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Pop the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// The segments from the root.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether this is `$`.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(i) => write!(f, "[{i}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
