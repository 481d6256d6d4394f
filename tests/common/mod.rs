use page_snapshot::{FlatMap, PageSource, Path, Result, Screenshot, SnapshotError};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;

/// In-memory page: one flat map per document, keyed by frame chain
/// ("" for the top document, host paths joined with " > " for frames)
pub struct FakePage {
    pub url: String,
    pub title: String,
    documents: HashMap<String, Value>,
    screenshot: Option<Vec<u8>>,
    pub queries: RefCell<Vec<(String, Vec<String>)>>,
}

impl FakePage {
    pub fn new(top: Value) -> Self {
        let mut documents = HashMap::new();
        documents.insert(String::new(), top);
        Self {
            url: "https://example.com/page".to_string(),
            title: "Example Page".to_string(),
            documents,
            screenshot: None,
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn with_frame(mut self, chain: &str, document: Value) -> Self {
        self.documents.insert(chain.to_string(), document);
        self
    }

    pub fn with_screenshot(mut self, width: u32, height: u32) -> Self {
        self.screenshot = Some(png(width, height));
        self
    }
}

impl PageSource for FakePage {
    fn query(&self, frames: &[Path], css_attributes: &[String]) -> Result<FlatMap> {
        let key = frames.iter().map(Path::to_string).collect::<Vec<_>>().join(" > ");
        self.queries.borrow_mut().push((key.clone(), css_attributes.to_vec()));

        let document = self.documents.get(&key).ok_or_else(|| SnapshotError::FrameUnavailable {
            path: key.clone(),
            reason: "frame was detached".to_string(),
        })?;
        serde_json::from_value(document.clone()).map_err(|e| SnapshotError::DomParseFailed(e.to_string()))
    }

    fn url(&self) -> Result<String> {
        Ok(self.url.clone())
    }

    fn title(&self) -> Result<String> {
        Ok(self.title.clone())
    }

    fn screenshot(&self) -> Result<Screenshot> {
        match &self.screenshot {
            Some(png) => Screenshot::from_png(png.clone()),
            None => Err(SnapshotError::ScreenshotFailed("no renderer".to_string())),
        }
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .unwrap();
    bytes
}
