use crate::browser::screenshot::{self, Screenshot};
use crate::dom::path::Path;
use crate::dom::path_index::FlatMap;
use crate::error::{Result, SnapshotError};
use headless_chrome::{Element, Tab};
use serde::Deserialize;

/// Element query script; takes (cssAttributes, framePaths, scopeElement)
const QUERY_JS: &str = include_str!("query.js");

/// Everything a capture needs from a live page
///
/// `frames` addresses a nested document: the document-local paths of the
/// frame hosts leading to it, outermost first. An empty slice means the
/// top-level document (or the scoped element, if the source has one).
pub trait PageSource {
    /// Run the element query and return its flat path -> record map
    fn query(&self, frames: &[Path], css_attributes: &[String]) -> Result<FlatMap>;

    fn url(&self) -> Result<String>;

    fn title(&self) -> Result<String>;

    fn screenshot(&self) -> Result<Screenshot>;
}

/// Envelope returned by the query script
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    elements: Option<FlatMap>,

    #[serde(default)]
    error: Option<String>,
}

/// [`PageSource`] backed by a `headless_chrome` tab, optionally scoped to one element
pub struct TabSource<'a> {
    tab: &'a Tab,
    scope: Option<&'a Element<'a>>,
}

impl<'a> TabSource<'a> {
    /// Capture the whole document of `tab`
    pub fn new(tab: &'a Tab) -> Self {
        Self { tab, scope: None }
    }

    /// Capture the subtree rooted at `element`
    pub fn for_element(element: &'a Element<'a>) -> Self {
        Self { tab: element.parent, scope: Some(element) }
    }

    fn evaluate(&self, frames: &[Path], css_attributes: &[String]) -> Result<serde_json::Value> {
        let attributes = serde_json::to_string(css_attributes)
            .map_err(|e| SnapshotError::EvaluationFailed(format!("Failed to encode attribute names: {}", e)))?;

        let remote = match (self.scope, frames.is_empty()) {
            (Some(element), true) => {
                let function = format!("function() {{ return ({})({}, [], this); }}", QUERY_JS, attributes);
                element
                    .call_js_fn(&function, vec![], false)
                    .map_err(|e| SnapshotError::EvaluationFailed(format!("Element query failed: {}", e)))?
            }
            _ => {
                let frame_paths: Vec<String> = frames.iter().map(Path::to_string).collect();
                let frame_paths = serde_json::to_string(&frame_paths)
                    .map_err(|e| SnapshotError::EvaluationFailed(format!("Failed to encode frame paths: {}", e)))?;
                let expression = format!("({})({}, {}, null)", QUERY_JS, attributes, frame_paths);
                self.tab
                    .evaluate(&expression, false)
                    .map_err(|e| SnapshotError::EvaluationFailed(format!("Document query failed: {}", e)))?
            }
        };

        remote
            .value
            .ok_or_else(|| SnapshotError::DomParseFailed("No value returned from element query".to_string()))
    }
}

impl PageSource for TabSource<'_> {
    fn query(&self, frames: &[Path], css_attributes: &[String]) -> Result<FlatMap> {
        let value = self.evaluate(frames, css_attributes)?;
        let response = parse_response(value)?;

        match (response.elements, response.error) {
            (_, Some(reason)) => match frames.last() {
                Some(frame) => Err(SnapshotError::FrameUnavailable { path: frame.to_string(), reason }),
                None => Err(SnapshotError::EvaluationFailed(reason)),
            },
            (Some(elements), None) => Ok(elements),
            (None, None) => Err(SnapshotError::DomParseFailed("Query result has no elements".to_string())),
        }
    }

    fn url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    fn title(&self) -> Result<String> {
        self.tab
            .get_title()
            .map_err(|e| SnapshotError::TabOperationFailed(format!("Failed to read page title: {}", e)))
    }

    fn screenshot(&self) -> Result<Screenshot> {
        screenshot::capture(self.tab)
    }
}

/// The script returns a JSON string, so the value is decoded twice
fn parse_response(value: serde_json::Value) -> Result<QueryResponse> {
    let json: String = serde_json::from_value(value)
        .map_err(|e| SnapshotError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

    serde_json::from_str(&json)
        .map_err(|e| SnapshotError::DomParseFailed(format!("Failed to parse element query result: {}", e)))
}
