//! Browser session management and the page-facing side of a capture
//!
//! - [`BrowserSession`]: launching or connecting to Chrome and picking the active tab
//! - [`PageSource`]: what a capture needs from a page (element query, metadata, screenshot)
//! - [`TabSource`]: the `headless_chrome` implementation of [`PageSource`]

pub mod config;
pub mod screenshot;
pub mod session;
pub mod source;

pub use config::{ConnectionOptions, LaunchOptions};
pub use screenshot::Screenshot;
pub use session::{BrowserSession, SnapshotSlot, TabElement};
pub use source::{PageSource, TabSource};
