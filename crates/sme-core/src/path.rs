//! Location paths into a manifest document

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
}

/// A dot/bracket path from some root to one field, e.g.
/// `semantic_models[0].measures[2].agg`.
///
/// Paths are built by extension so each validator can be handed a base path
/// (the manifest root, or the item being edited on its own) and report
/// locations relative to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// The empty path
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend with a named field
    pub fn field(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Field(name.to_string()));
        Self(segments)
    }

    /// Extend with a named array field and an element index
    pub fn index(&self, name: &str, idx: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Field(name.to_string()));
        segments.push(Segment::Index(idx));
        Self(segments)
    }

    /// Whether this is the empty path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path() {
        let path = FieldPath::root()
            .index("semantic_models", 0)
            .index("measures", 2)
            .field("agg");
        assert_eq!(path.to_string(), "semantic_models[0].measures[2].agg");
    }

    #[test]
    fn test_relative_path() {
        let path = FieldPath::root()
            .index("dimensions", 0)
            .field("type_params")
            .field("time_granularity");
        assert_eq!(path.to_string(), "dimensions[0].type_params.time_granularity");
    }

    #[test]
    fn test_root_path() {
        assert!(FieldPath::root().is_root());
        assert_eq!(FieldPath::root().to_string(), "$");
    }
}
