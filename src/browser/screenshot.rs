use crate::error::{Result, SnapshotError};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::Tab;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// PNG rendering of a page, taken once per top-level document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,

    /// Encoded PNG bytes (base64 in serialized form)
    #[serde(with = "base64_bytes")]
    pub png: Vec<u8>,
}

impl Screenshot {
    /// Wrap PNG bytes, reading the dimensions from the image header
    pub fn from_png(png: Vec<u8>) -> Result<Self> {
        let (width, height) = image::io::Reader::with_format(Cursor::new(&png), image::ImageFormat::Png)
            .into_dimensions()
            .map_err(|e| SnapshotError::ScreenshotFailed(format!("Invalid PNG data: {}", e)))?;

        Ok(Self { width, height, png })
    }

    /// Write the PNG to disk
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, &self.png)?;
        Ok(())
    }
}

/// Capture the current viewport of `tab`
pub fn capture(tab: &Tab) -> Result<Screenshot> {
    let png = tab
        .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
        .map_err(|e| SnapshotError::ScreenshotFailed(e.to_string()))?;

    Screenshot::from_png(png)
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}
