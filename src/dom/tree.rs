use crate::dom::attributes::{normalize_record, strip_defaults, DefaultValueFinder};
use crate::dom::element::ElementNode;
use crate::dom::identifier::{disambiguate_siblings, IdProvider};
use crate::dom::path::Path;
use crate::dom::path_index::{FlatMap, PathIndex};
use crate::error::{Result, SnapshotError};

/// Turns a flat element query result into a tree of [`ElementNode`]s
///
/// Each node gets its record's attributes minus platform defaults and an
/// identifier from the [`IdProvider`]. Sibling identifiers are made unique in
/// sibling order.
pub struct TreeBuilder<'a> {
    defaults: &'a dyn DefaultValueFinder,
    ids: &'a dyn IdProvider,

    /// Prepended to every node path (the hosting element's path for frames)
    prefix: Option<Path>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(defaults: &'a dyn DefaultValueFinder, ids: &'a dyn IdProvider) -> Self {
        Self { defaults, ids, prefix: None }
    }

    /// Builder method: place the converted document below `prefix`
    pub fn with_prefix(mut self, prefix: Path) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Index `flat` and convert it
    pub fn build(&self, flat: &FlatMap) -> Result<ElementNode> {
        let index = PathIndex::build(flat)?;
        self.convert(&index, flat)
    }

    /// Convert `flat` starting at the index root
    ///
    /// Any inconsistency between index and map aborts the whole conversion;
    /// no partial tree is returned.
    pub fn convert(&self, index: &PathIndex, flat: &FlatMap) -> Result<ElementNode> {
        self.convert_path(index, flat, index.root())
    }

    fn convert_path(&self, index: &PathIndex, flat: &FlatMap, path: &Path) -> Result<ElementNode> {
        let record = index
            .key_of(path)
            .and_then(|key| flat.get(key))
            .ok_or_else(|| SnapshotError::MissingRecord(path.to_string()))?;

        let (tag, raw_attributes) = normalize_record(path, record)?;
        let attributes = strip_defaults(&tag, raw_attributes, self.defaults);
        let id = self.ids.id_for(&tag, &attributes);

        let mut children = index
            .children_of(path)
            .iter()
            .map(|child| self.convert_path(index, flat, child))
            .collect::<Result<Vec<_>>>()?;
        self.disambiguate(&mut children);

        let absolute = match &self.prefix {
            Some(prefix) => prefix.join(path),
            None => path.clone(),
        };

        Ok(ElementNode::new(tag, absolute)
            .with_id(id)
            .with_attributes(attributes)
            .with_children(children))
    }

    fn disambiguate(&self, children: &mut [ElementNode]) {
        let mut ids: Vec<String> = children.iter().map(|c| c.id.clone()).collect();
        disambiguate_siblings(&mut ids, self.ids);
        for (child, id) in children.iter_mut().zip(ids) {
            child.id = id;
        }
    }
}
