//! # page-snapshot
//!
//! Captures the observable state of a live web page (rendered DOM, attached
//! frames and a screenshot) via Chrome DevTools Protocol and converts it into
//! a stable, hierarchical snapshot that can be diffed against other snapshots
//! of the same page.
//!
//! ## Features
//!
//! - **Single-query capture**: one injected script returns every element as a
//!   `path -> attributes` map, including a configurable set of computed CSS properties
//! - **Tree reconstruction**: the flat map is rebuilt into a nested element tree
//!   ordered by sibling position, independent of the order the page reported it in
//! - **Default filtering**: attribute values equal to the platform default are omitted
//! - **Stable identifiers**: derived from identity-relevant attributes, not positions
//! - **Frames**: nested documents are captured the same way and spliced in under their host
//!
//! ## Usage
//!
//! ```rust,no_run
//! use page_snapshot::{BrowserSession, LaunchOptions, SnapshotConfig, Snapshotter};
//!
//! # fn main() -> page_snapshot::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! session.navigate("https://example.com")?;
//! session.wait_for_navigation()?;
//!
//! let snapshotter = Snapshotter::new(SnapshotConfig::bundled());
//! for snapshot in session.capture(&snapshotter)? {
//!     println!("{}: {} elements", snapshot.url, snapshot.count_elements());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Converting a query result without a browser
//!
//! ```rust
//! use page_snapshot::{FlatMap, Snapshotter};
//! use serde_json::json;
//!
//! # fn main() -> page_snapshot::Result<()> {
//! let flat: FlatMap = serde_json::from_value(json!({
//!     "/html[1]": {"tagName": "html"},
//!     "/html[1]/body[1]": {"tagName": "body", "class": "home"},
//! })).unwrap();
//!
//! let snapshot = Snapshotter::default().convert(&flat, "https://example.com", "Example", None)?;
//! assert_eq!(snapshot.element.children[0].tag_name, "body");
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management, the page source abstraction and screenshots
//! - [`capture`]: Capture targets and the [`Snapshotter`] entry point
//! - [`config`]: YAML configuration (CSS attributes, default values, identity attributes)
//! - [`dom`]: Paths, path index, tree building, identifiers and frame recursion
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod capture;
pub mod config;
pub mod dom;
pub mod error;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions, PageSource, Screenshot, TabElement, TabSource};
pub use capture::{CaptureTarget, Snapshotter, WrapsElement};
pub use config::SnapshotConfig;
pub use dom::{AttributeValue, ElementNode, FlatMap, IdProvider, Path, RootElement};
pub use error::{Result, SnapshotError};
