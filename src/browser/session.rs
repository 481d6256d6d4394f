use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            capture::{CaptureTarget, Snapshotter, WrapsElement},
            dom::RootElement,
            error::{Result, SnapshotError}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr,
          sync::{Arc, Mutex, PoisonError},
          time::Duration};

/// Wrapper for Tab and Element to maintain proper lifetime relationships
pub struct TabElement<'a> {
    pub tab: Arc<Tab>,
    pub element: headless_chrome::Element<'a>,
}

impl WrapsElement for TabElement<'_> {
    fn wrapped_element(&self) -> Option<CaptureTarget<'_>> {
        Some(CaptureTarget::Element(&self.element))
    }
}

/// Most recent snapshot taken through a [`BrowserSession`]
///
/// Kept until the next successful capture, so a caller whose comparison
/// failed can still read back the state it compared against.
#[derive(Debug, Default)]
pub struct SnapshotSlot {
    last: Mutex<Option<RootElement>>,
}

impl SnapshotSlot {
    /// Remember the first snapshot of a capture; an empty capture leaves the slot as is
    pub fn store(&self, snapshots: &[RootElement]) {
        if let Some(first) = snapshots.first() {
            *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(first.clone());
        }
    }

    pub fn get(&self) -> Option<RootElement> {
        self.last.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    last_snapshot: SnapshotSlot,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Keep pages from detecting automation and rendering differently
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Default idle timeout is 30 seconds, too short for pages with many frames
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;

        // Fixed window size keeps layout attributes comparable across runs
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| SnapshotError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| SnapshotError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, last_snapshot: SnapshotSlot::default() })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| SnapshotError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser, last_snapshot: SnapshotSlot::default() })
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| SnapshotError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility and focus state
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        // First pass: visible and focused (strongest signal)
        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible' && document.hasFocus()", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab status: {}", e);
                    continue;
                }
            }
        }

        // Second pass: just visible
        for tab in &tabs {
            if let Ok(remote_object) = tab.evaluate("document.visibilityState === 'visible'", false) {
                if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                    return Ok(tab.clone());
                }
            }
        }

        // Headless tabs may report neither; fall back to the only tab there is
        if let [only] = tabs.as_slice() {
            return Ok(only.clone());
        }

        Err(SnapshotError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| SnapshotError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| SnapshotError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Find an element by CSS selector using the provided tab
    pub fn find_element<'a>(&self, tab: &'a Arc<Tab>, css_selector: &str) -> Result<headless_chrome::Element<'a>> {
        tab.find_element(css_selector)
            .map_err(|e| SnapshotError::ElementNotFound(format!("Element '{}' not found: {}", css_selector, e)))
    }

    /// Capture the active tab's document
    pub fn capture(&self, snapshotter: &Snapshotter) -> Result<Vec<RootElement>> {
        let snapshots = snapshotter.capture(&CaptureTarget::Session(self))?;
        self.last_snapshot.store(&snapshots);
        Ok(snapshots)
    }

    /// Capture the subtree of the first element matching `css_selector` in the active tab
    pub fn capture_element(&self, snapshotter: &Snapshotter, css_selector: &str) -> Result<Vec<RootElement>> {
        let tab = self.tab()?;
        let element = self.find_element(&tab, css_selector)?;
        let wrapped = TabElement { tab: tab.clone(), element };
        let snapshots = snapshotter.capture(&CaptureTarget::Wrapped(&wrapped))?;
        self.last_snapshot.store(&snapshots);
        Ok(snapshots)
    }

    /// The snapshot taken by the latest successful [`BrowserSession::capture`]
    /// or [`BrowserSession::capture_element`]
    pub fn last_snapshot(&self) -> Option<RootElement> {
        self.last_snapshot.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options_builder() {
        let opts = LaunchOptions::new().headless(true).window_size(800, 600);

        assert!(opts.headless);
        assert_eq!(opts.window_width, 800);
        assert_eq!(opts.window_height, 600);
    }

    #[test]
    fn test_connection_options() {
        let opts = ConnectionOptions::new("ws://localhost:9222").timeout(5000);

        assert_eq!(opts.ws_url, "ws://localhost:9222");
        assert_eq!(opts.timeout, 5000);
    }

    fn snapshot(url: &str) -> RootElement {
        let root = crate::dom::ElementNode::new("html", "/html[1]".parse().unwrap());
        RootElement::assemble(root, url, "", None)
    }

    #[test]
    fn test_snapshot_slot_keeps_latest() {
        let slot = SnapshotSlot::default();
        assert!(slot.get().is_none());

        slot.store(&[snapshot("https://example.com/a"), snapshot("https://example.com/ignored")]);
        assert_eq!(slot.get().map(|s| s.url), Some("https://example.com/a".to_string()));

        slot.store(&[snapshot("https://example.com/b")]);
        assert_eq!(slot.get().map(|s| s.url), Some("https://example.com/b".to_string()));
    }

    #[test]
    fn test_snapshot_slot_ignores_empty_capture() {
        let slot = SnapshotSlot::default();
        slot.store(&[snapshot("https://example.com/a")]);
        slot.store(&[]);
        assert_eq!(slot.get().map(|s| s.url), Some("https://example.com/a".to_string()));
    }

    // Integration tests (require Chrome to be installed)
    #[test]
    #[ignore] // Ignore by default, run with: cargo test -- --ignored
    fn test_launch_browser() {
        let result = BrowserSession::launch(LaunchOptions::new().headless(true));
        assert!(result.is_ok());
    }

    #[test]
    #[ignore]
    fn test_get_active_tab() {
        let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

        let tab = session.get_active_tab();
        assert!(tab.is_ok());
    }

    #[test]
    #[ignore]
    fn test_navigate() {
        let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");

        let result = session.navigate("about:blank");
        assert!(result.is_ok());
    }
}
