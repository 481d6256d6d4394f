//! Path index over a flat element query result
//!
//! The element query returns an unordered `path -> record` map. [`PathIndex`]
//! parses every key once, checks that the paths form exactly one tree, and
//! answers "what is the root" and "what are this path's children" in sibling
//! order, independent of the order the map was produced in.
//!
//! Sibling order is document order: the position the query script records
//! among all element siblings, falling back to the path's last step for
//! records without one.

use crate::dom::attributes::SCRIPT_POSITION_KEY;
use crate::dom::path::{Path, Step};
use crate::error::{Result, SnapshotError};
use indexmap::IndexMap;
use std::collections::HashMap;

/// One element record as returned by the query script
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Query result for one document: raw path string -> raw record
pub type FlatMap = IndexMap<String, RawRecord>;

/// Parent/child structure derived from the paths of a [`FlatMap`]
#[derive(Debug, Clone)]
pub struct PathIndex {
    root: Path,

    /// Canonical path -> key of its record in the flat map
    keys: HashMap<Path, String>,

    /// Parent -> children in document order
    children: HashMap<Path, Vec<Path>>,
}

impl PathIndex {
    /// Index the paths of `flat`
    ///
    /// Fails when a key is not a valid path, two keys denote the same path,
    /// the shallowest level holds more than one path, or a path's parent is
    /// missing from the map.
    pub fn build(flat: &FlatMap) -> Result<Self> {
        let mut keys: HashMap<Path, String> = HashMap::with_capacity(flat.len());

        for raw in flat.keys() {
            let path: Path = raw.parse()?;
            if let Some(first) = keys.get(&path) {
                return Err(SnapshotError::DuplicatePath {
                    path: path.to_string(),
                    first: first.clone(),
                    second: raw.clone(),
                });
            }
            keys.insert(path, raw.clone());
        }

        let root = Self::find_root(&keys)?;

        let mut children: HashMap<Path, Vec<Path>> = HashMap::new();
        for path in keys.keys() {
            if *path == root {
                continue;
            }
            let parent = path.parent().ok_or_else(|| SnapshotError::MultipleRoots {
                first: root.to_string(),
                second: path.to_string(),
            })?;
            if !keys.contains_key(&parent) {
                return Err(SnapshotError::MissingAncestor {
                    path: path.to_string(),
                    missing: parent.to_string(),
                });
            }
            children.entry(parent).or_default().push(path.clone());
        }

        for siblings in children.values_mut() {
            siblings.sort_by_cached_key(|path| sibling_key(path, keys.get(path).and_then(|key| flat.get(key))));
        }

        Ok(Self { root, keys, children })
    }

    /// The unique shallowest path; ties are broken by sibling order so that
    /// the error names the same pair on every run
    fn find_root(keys: &HashMap<Path, String>) -> Result<Path> {
        let min_depth = keys.keys().map(Path::depth).min().ok_or(SnapshotError::EmptyDocument)?;

        let mut shallowest: Vec<&Path> = keys.keys().filter(|p| p.depth() == min_depth).collect();
        shallowest.sort();

        match shallowest.as_slice() {
            [root] => Ok((*root).clone()),
            [first, second, ..] => Err(SnapshotError::MultipleRoots {
                first: first.to_string(),
                second: second.to_string(),
            }),
            [] => Err(SnapshotError::EmptyDocument),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Direct children of `path` in sibling order
    pub fn children_of(&self, path: &Path) -> &[Path] {
        self.children.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Key of `path`'s record in the flat map the index was built from
    pub fn key_of(&self, path: &Path) -> Option<&str> {
        self.keys.get(path).map(String::as_str)
    }
}

/// Recorded positions sort first; the step breaks ties and orders records without one
fn sibling_key(path: &Path, record: Option<&RawRecord>) -> (u64, Step) {
    let position = record
        .and_then(|record| record.get(SCRIPT_POSITION_KEY))
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(u64::MAX);
    (position, path.last().clone())
}
