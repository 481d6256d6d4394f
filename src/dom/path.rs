//! Structural paths
//!
//! A [`Path`] locates an element inside one document as a sequence of
//! [`Step`]s, e.g. `/html[1]/body[1]/div[2]`. Paths are the only structural
//! information the element query hands back, so parent/child relations and
//! sibling order are derived from them alone.

use crate::error::{Result, SnapshotError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One level of a path
///
/// The derived ordering (index, then tag) is the fallback sibling order for
/// records that carry no document position. It matches document order only
/// for positional steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Step {
    /// Sibling index (1-based per tag for `tag[n]`, as written for bare integers)
    pub index: u32,

    /// Lowercased tag name, `None` for purely positional steps
    pub tag: Option<String>,
}

impl Step {
    /// Create a `tag[index]` step
    pub fn tagged(tag: impl Into<String>, index: u32) -> Self {
        Self { index, tag: Some(tag.into().to_ascii_lowercase()) }
    }

    /// Create a positional step
    pub fn positional(index: u32) -> Self {
        Self { index, tag: None }
    }

    fn parse(raw: &str, whole: &str) -> Result<Self> {
        let invalid = |reason: &str| SnapshotError::InvalidPath {
            path: whole.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("empty step"));
        }

        if raw.bytes().all(|b| b.is_ascii_digit()) {
            let index = raw.parse().map_err(|_| invalid("step index out of range"))?;
            return Ok(Self::positional(index));
        }

        let (tag, index) = match raw.find('[') {
            Some(open) => {
                let inner = raw[open + 1..]
                    .strip_suffix(']')
                    .ok_or_else(|| invalid("unterminated '[' in step"))?;
                let index = inner
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| invalid("step index is not a number"))?;
                (&raw[..open], index)
            }
            None => (raw, 1),
        };

        if tag.is_empty() {
            return Err(invalid("step has no tag"));
        }
        if tag.chars().any(|c| c.is_whitespace() || c == '[' || c == ']') {
            return Err(invalid("step tag contains illegal characters"));
        }

        Ok(Self::tagged(tag, index))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => write!(f, "{}[{}]", tag, self.index),
            None => write!(f, "{}", self.index),
        }
    }
}

/// Position of an element in its document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// Number of steps
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// The final step
    pub fn last(&self) -> &Step {
        // non-empty by construction
        &self.steps[self.steps.len() - 1]
    }

    /// Tag of the final step, if the path carries one
    pub fn tag(&self) -> Option<&str> {
        self.last().tag.as_deref()
    }

    /// The path with its last step stripped, `None` for single-step paths
    pub fn parent(&self) -> Option<Path> {
        if self.steps.len() <= 1 {
            return None;
        }
        Some(Self { steps: self.steps[..self.steps.len() - 1].to_vec() })
    }

    /// Whether `prefix` is this path or one of its ancestors
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.steps.starts_with(&prefix.steps)
    }

    /// Append `other`'s steps below this path
    pub fn join(&self, other: &Path) -> Path {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        Self { steps }
    }

    /// Remove `prefix` from the front; `None` unless a strict prefix
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if !self.starts_with(prefix) || self.steps.len() == prefix.steps.len() {
            return None;
        }
        Some(Self { steps: self.steps[prefix.steps.len()..].to_vec() })
    }
}

impl FromStr for Path {
    type Err = SnapshotError;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let body = trimmed.trim_start_matches('/');

        if body.is_empty() {
            return Err(SnapshotError::InvalidPath {
                path: raw.to_string(),
                reason: "path has no steps".to_string(),
            });
        }

        let steps = body
            .split('/')
            .map(|step| Step::parse(step, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { steps })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{}", step)?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
