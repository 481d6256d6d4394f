//! Capture entry point
//!
//! [`Snapshotter`] turns a [`CaptureTarget`] (a tab, a session, an element, or
//! something wrapping an element) into [`RootElement`]s: it runs the element
//! query, converts the result into a tree, splices in frame content and
//! attaches URL, title and screenshot.

use crate::browser::screenshot::Screenshot;
use crate::browser::session::BrowserSession;
use crate::browser::source::{PageSource, TabSource};
use crate::config::SnapshotConfig;
use crate::dom::frames::FrameConverter;
use crate::dom::identifier::{HashIdProvider, IdProvider};
use crate::dom::path_index::{FlatMap, PathIndex};
use crate::dom::tree::TreeBuilder;
use crate::dom::RootElement;
use crate::error::{Result, SnapshotError};
use headless_chrome::{Element, Tab};
use std::sync::Arc;

/// Wrapper chains longer than this are rejected
const MAX_WRAP_DEPTH: usize = 16;

/// Something that stands in for a page element
pub trait WrapsElement {
    /// The wrapped target, `None` if nothing is wrapped
    fn wrapped_element(&self) -> Option<CaptureTarget<'_>>;
}

/// What can be handed to [`Snapshotter::capture`]
#[derive(Clone, Copy)]
pub enum CaptureTarget<'a> {
    /// Whole document of a tab
    Tab(&'a Arc<Tab>),

    /// Whole document of the session's active tab
    Session(&'a BrowserSession),

    /// Subtree rooted at an element
    Element(&'a Element<'a>),

    /// An element behind a wrapper; must resolve to [`CaptureTarget::Element`]
    Wrapped(&'a dyn WrapsElement),
}

impl<'a> CaptureTarget<'a> {
    /// Short name of the target kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            CaptureTarget::Tab(_) => "tab",
            CaptureTarget::Session(_) => "browser session",
            CaptureTarget::Element(_) => "element",
            CaptureTarget::Wrapped(_) => "element wrapper",
        }
    }

    /// Unwrap wrappers until a capturable kind is reached
    ///
    /// A wrapper must end in an element; wrappers around tabs or sessions,
    /// empty wrappers and overly long chains are unsupported.
    pub fn resolve(self) -> Result<CaptureTarget<'a>> {
        let mut current = self;
        let mut inside_wrapper = false;

        for _ in 0..MAX_WRAP_DEPTH {
            match current {
                CaptureTarget::Wrapped(wrapper) => {
                    inside_wrapper = true;
                    current = wrapper
                        .wrapped_element()
                        .ok_or_else(|| SnapshotError::UnsupportedTarget("empty element wrapper".to_string()))?;
                }
                CaptureTarget::Element(_) => return Ok(current),
                other if inside_wrapper => {
                    return Err(SnapshotError::UnsupportedTarget(format!("element wrapper around a {}", other.kind())));
                }
                other => return Ok(other),
            }
        }

        Err(SnapshotError::UnsupportedTarget(format!(
            "element wrapper nested more than {} levels",
            MAX_WRAP_DEPTH
        )))
    }
}

/// Converts live pages into snapshots using one immutable configuration
#[derive(Clone)]
pub struct Snapshotter {
    config: Arc<SnapshotConfig>,
    ids: Arc<dyn IdProvider>,
}

impl Snapshotter {
    pub fn new(config: SnapshotConfig) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    /// Share a configuration already loaded elsewhere
    pub fn with_shared_config(config: Arc<SnapshotConfig>) -> Self {
        let ids = Arc::new(HashIdProvider::new(&config.identity));
        Self { config, ids }
    }

    /// Builder method: replace the identifier provider
    pub fn with_id_provider(mut self, ids: Arc<dyn IdProvider>) -> Self {
        self.ids = ids;
        self
    }

    /// Whether `target` is of a kind [`Snapshotter::capture`] accepts
    pub fn can_capture(&self, target: &CaptureTarget<'_>) -> bool {
        target.resolve().is_ok()
    }

    /// Capture `target`, one [`RootElement`] per top-level document
    pub fn capture(&self, target: &CaptureTarget<'_>) -> Result<Vec<RootElement>> {
        let root = match target.resolve()? {
            CaptureTarget::Tab(tab) => {
                log::info!("Retrieving attributes for each element.");
                self.capture_source(&TabSource::new(tab))?
            }
            CaptureTarget::Session(session) => {
                log::info!("Retrieving attributes for each element.");
                let tab = session.tab()?;
                self.capture_source(&TabSource::new(&tab))?
            }
            CaptureTarget::Element(element) => {
                log::info!("Retrieving attributes for element <{}>.", element.tag_name.to_ascii_lowercase());
                self.capture_source(&TabSource::for_element(element))?
            }
            CaptureTarget::Wrapped(_) => {
                return Err(SnapshotError::UnsupportedTarget("unresolved element wrapper".to_string()));
            }
        };

        Ok(vec![root])
    }

    /// Capture the document (or element subtree) behind `source`
    pub fn capture_source(&self, source: &dyn PageSource) -> Result<RootElement> {
        let css_attributes = &self.config.css_attributes;
        let flat = source.query(&[], css_attributes)?;
        let url = source.url()?;
        let title = source.title()?;
        let screenshot = self.take_screenshot(source);

        let mut root = self.convert(&flat, url, title, screenshot)?;

        let frames = FrameConverter::new(source, css_attributes, &self.config.defaults, self.ids.as_ref());
        let attached = frames.attach_frames(&mut root.element);
        if attached > 0 {
            log::info!("Attached {} frame(s), {} elements in total.", attached, root.count_elements());
        }

        Ok(root)
    }

    /// Convert an already obtained query result into a snapshot
    pub fn convert(
        &self,
        flat: &FlatMap,
        url: impl Into<String>,
        title: impl Into<String>,
        screenshot: Option<Screenshot>,
    ) -> Result<RootElement> {
        let url = url.into();
        let index = PathIndex::build(flat)?;
        log::info!("Checking website {} with {} elements.", url, flat.len());

        let element = TreeBuilder::new(&self.config.defaults, self.ids.as_ref()).convert(&index, flat)?;
        Ok(RootElement::assemble(element, url, title, screenshot))
    }

    fn take_screenshot(&self, source: &dyn PageSource) -> Option<Screenshot> {
        if !self.config.screenshot.enabled {
            return None;
        }
        match source.screenshot() {
            Ok(screenshot) => Some(screenshot),
            Err(e) => {
                log::warn!("Continuing without screenshot: {}", e);
                None
            }
        }
    }
}

impl Default for Snapshotter {
    fn default() -> Self {
        Self::new(SnapshotConfig::bundled())
    }
}
