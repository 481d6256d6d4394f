use crate::browser::screenshot::Screenshot;
use crate::dom::attributes::{AttributeValue, Attributes};
use crate::dom::path::Path;
use crate::error::{Result, SnapshotError};
use serde::{Deserialize, Serialize};

/// Tags whose elements host a nested document
pub const FRAME_TAGS: [&str; 2] = ["iframe", "frame"];

/// One converted DOM element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// Stable identifier (see [`crate::dom::identifier`])
    pub id: String,

    /// Lowercased HTML tag name (e.g., "div", "button", "iframe")
    pub tag_name: String,

    /// Absolute path of the element; frame content is prefixed with the host's path
    pub path: Path,

    /// Attributes that differ from their platform default
    #[serde(default)]
    pub attributes: Attributes,

    /// Child elements in sibling order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// Create a new ElementNode without identifier or attributes
    pub fn new(tag_name: impl Into<String>, path: Path) -> Self {
        Self {
            id: String::new(),
            tag_name: tag_name.into(),
            path,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Builder method: set identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Add a child element
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(child);
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// The element's HTML `id` attribute
    pub fn html_id(&self) -> Option<&str> {
        self.get_attribute("id").and_then(AttributeValue::as_str)
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Whether this element hosts a nested document
    pub fn is_frame_host(&self) -> bool {
        FRAME_TAGS.iter().any(|tag| self.is_tag(tag))
    }

    /// Number of elements in this subtree, including this one
    pub fn count_elements(&self) -> usize {
        1 + self.children.iter().map(ElementNode::count_elements).sum::<usize>()
    }

    /// Depth-first, pre-order iteration over this subtree
    pub fn iter(&self) -> impl Iterator<Item = &ElementNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Find an element in this subtree by path
    pub fn find_by_path(&self, path: &Path) -> Option<&ElementNode> {
        if !path.starts_with(&self.path) {
            return None;
        }
        if self.path == *path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find_by_path(path))
    }

    /// Find an element in this subtree by identifier
    pub fn find_by_id(&self, id: &str) -> Option<&ElementNode> {
        self.iter().find(|node| node.id == id)
    }
}

/// Top-level converted element of one captured document, with page metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootElement {
    /// Converted document (or element subtree) including spliced frames
    pub element: ElementNode,

    /// Page URL at capture time
    pub url: String,

    /// Page title at capture time
    pub title: String,

    /// Rendered page, taken once per top-level document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<Screenshot>,
}

impl RootElement {
    /// Combine a converted tree with the page metadata
    pub fn assemble(
        element: ElementNode,
        url: impl Into<String>,
        title: impl Into<String>,
        screenshot: Option<Screenshot>,
    ) -> Self {
        Self {
            element,
            url: url.into(),
            title: title.into(),
            screenshot,
        }
    }

    /// Count total elements in the tree
    pub fn count_elements(&self) -> usize {
        self.element.count_elements()
    }

    /// Convert the snapshot to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::DomParseFailed(format!("Failed to serialize snapshot to JSON: {}", e)))
    }
}
