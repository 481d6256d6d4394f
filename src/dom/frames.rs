//! Frame recursion
//!
//! After a document has been converted, every frame-hosting element is
//! captured again through the [`PageSource`], scoped to the nested document,
//! and the resulting subtree is appended as the host's last child. Nested
//! frames are handled by the same walk before the enclosing frame is attached.

use crate::browser::source::PageSource;
use crate::dom::attributes::DefaultValueFinder;
use crate::dom::element::ElementNode;
use crate::dom::identifier::IdProvider;
use crate::dom::path::Path;
use crate::dom::tree::TreeBuilder;
use crate::error::{Result, SnapshotError};

/// Frames nested deeper than this are not captured
pub const MAX_FRAME_DEPTH: usize = 8;

pub struct FrameConverter<'a> {
    source: &'a dyn PageSource,
    css_attributes: &'a [String],
    defaults: &'a dyn DefaultValueFinder,
    ids: &'a dyn IdProvider,
}

impl<'a> FrameConverter<'a> {
    pub fn new(
        source: &'a dyn PageSource,
        css_attributes: &'a [String],
        defaults: &'a dyn DefaultValueFinder,
        ids: &'a dyn IdProvider,
    ) -> Self {
        Self { source, css_attributes, defaults, ids }
    }

    /// Attach the content of every frame below `root`, returning how many
    /// frames were attached (nested ones included)
    ///
    /// A frame that cannot be captured is logged and left without content;
    /// the rest of the document is unaffected.
    pub fn attach_frames(&self, root: &mut ElementNode) -> usize {
        let mut chain = Vec::new();
        self.walk(root, None, &mut chain)
    }

    /// `document` is the absolute path of the frame host owning the document
    /// `node` belongs to; `chain` holds the document-local host paths that
    /// lead to it, outermost first.
    fn walk(&self, node: &mut ElementNode, document: Option<&Path>, chain: &mut Vec<Path>) -> usize {
        let mut attached = 0;

        let frame = if node.is_frame_host() {
            self.capture_frame(node, document, chain, &mut attached)
        } else {
            None
        };

        for child in node.children.iter_mut() {
            attached += self.walk(child, document, chain);
        }

        if let Some(frame) = frame {
            node.add_child(frame);
        }

        attached
    }

    fn capture_frame(
        &self,
        host: &ElementNode,
        document: Option<&Path>,
        chain: &mut Vec<Path>,
        attached: &mut usize,
    ) -> Option<ElementNode> {
        let local = match document {
            Some(prefix) => host.path.strip_prefix(prefix)?,
            None => host.path.clone(),
        };

        if chain.len() >= MAX_FRAME_DEPTH {
            log::warn!(
                "Skipping frame at {}: nested deeper than {} frames",
                host.path,
                MAX_FRAME_DEPTH
            );
            return None;
        }

        chain.push(local);
        let result = self.convert_frame(&host.path, chain);
        let frame = match result {
            Ok(mut frame) => {
                log::debug!("Attaching frame at {} with {} elements", host.path, frame.count_elements());
                *attached += 1 + self.walk(&mut frame, Some(&host.path), chain);
                Some(frame)
            }
            Err(e) => {
                log::warn!("Omitting frame at {}: {}", host.path, e);
                None
            }
        };
        chain.pop();

        frame
    }

    fn convert_frame(&self, host: &Path, chain: &[Path]) -> Result<ElementNode> {
        let flat = self.source.query(chain, self.css_attributes).map_err(|e| match e {
            SnapshotError::FrameUnavailable { .. } => e,
            other => SnapshotError::FrameUnavailable {
                path: host.to_string(),
                reason: other.to_string(),
            },
        })?;

        TreeBuilder::new(self.defaults, self.ids)
            .with_prefix(host.clone())
            .build(&flat)
    }
}
