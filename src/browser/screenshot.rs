use crate::error::{BrowserError, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use headless_chrome::Tab;
use headless_chrome::protocol::cdp::Page::{CaptureScreenshotFormatOption, Viewport};
use image::{DynamicImage, GenericImageView, ImageOutputFormat, imageops::FilterType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{io::Cursor, path::Path, str::FromStr, sync::Arc};

const PAGE_SIZE_SCRIPT: &str = r#"(function () {
    var root = document.documentElement;
    var body = document.body;
    return JSON.stringify([
        Math.max(root ? root.scrollWidth : 0, body ? body.scrollWidth : 0),
        Math.max(root ? root.scrollHeight : 0, body ? body.scrollHeight : 0)
    ]);
})()"#;

/// Page area captured when the snapshot has no explicit root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenshotMode {
    /// The whole scrollable document
    #[default]
    FullPage,
    /// Only the visible viewport
    Viewport,
}

impl FromStr for ScreenshotMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "full-page" => Ok(Self::FullPage),
            "viewport" => Ok(Self::Viewport),
            other => Err(format!("'{}' is not a screenshot mode (full-page, viewport)", other)),
        }
    }
}

/// What a screenshot actually covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotTarget<'a> {
    FullPage,
    Viewport,
    /// The first element matching a CSS selector
    Element(&'a str),
}

impl<'a> ScreenshotTarget<'a> {
    /// A snapshot root narrows the screenshot to that element, whatever the mode
    pub fn resolve(mode: ScreenshotMode, root_selector: Option<&'a str>) -> Self {
        match (root_selector, mode) {
            (Some(selector), _) => Self::Element(selector),
            (None, ScreenshotMode::FullPage) => Self::FullPage,
            (None, ScreenshotMode::Viewport) => Self::Viewport,
        }
    }
}

/// A PNG screenshot resized to the snapshot's reference width
///
/// Pixel coordinates in the image line up with the `absolute-*` geometry of
/// a snapshot taken with the same reference width.
#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl Screenshot {
    /// Capture `target` from the tab and resize it
    pub fn capture(tab: &Arc<Tab>, target: ScreenshotTarget, reference_width: f64) -> Result<Self> {
        let raw = match target {
            ScreenshotTarget::Element(selector) => tab
                .find_element(selector)
                .map_err(|e| BrowserError::ElementNotFound(format!("Screenshot root '{}': {}", selector, e)))?
                .capture_screenshot(CaptureScreenshotFormatOption::Png),
            ScreenshotTarget::Viewport => tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true),
            ScreenshotTarget::FullPage => {
                let (width, height) = page_size(tab)?;
                let clip = Viewport { x: 0.0, y: 0.0, width, height, scale: 1.0 };
                tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            }
        }
        .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))?;

        let screenshot = Self::from_png(&raw, reference_width)?;
        log::debug!("Captured {:?} screenshot ({}x{})", target, screenshot.width, screenshot.height);
        Ok(screenshot)
    }

    /// Decode a PNG and resize it to `reference_width`, keeping the aspect ratio
    pub fn from_png(bytes: &[u8], reference_width: f64) -> Result<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| BrowserError::ScreenshotFailed(format!("Undecodable screenshot: {}", e)))?;
        Self::from_image(&image, reference_width)
    }

    fn from_image(image: &DynamicImage, reference_width: f64) -> Result<Self> {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = scaled_size(width, height, reference_width)?;
        let resized = image.resize_exact(new_width, new_height, FilterType::Triangle);

        let mut png = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
            .map_err(|e| BrowserError::ScreenshotFailed(format!("Failed to encode screenshot: {}", e)))?;

        Ok(Self { width: new_width, height: new_height, png })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encoded PNG bytes
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.png)
            .map_err(|e| BrowserError::ScreenshotFailed(format!("Failed to write {}: {}", path.display(), e)))
    }
}

/// Size of a `width` x `height` image scaled to `reference_width` wide
fn scaled_size(width: u32, height: u32, reference_width: f64) -> Result<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(BrowserError::ScreenshotFailed(format!("Empty screenshot ({}x{})", width, height)));
    }
    if !reference_width.is_finite() || reference_width < 1.0 {
        return Err(BrowserError::Config(format!(
            "Reference width {} is too small for a screenshot",
            reference_width
        )));
    }

    let factor = reference_width / f64::from(width);
    let new_height = (f64::from(height) * factor).round().max(1.0);
    Ok((reference_width.round() as u32, new_height as u32))
}

fn page_size(tab: &Arc<Tab>) -> Result<(f64, f64)> {
    let result = tab
        .evaluate(PAGE_SIZE_SCRIPT, false)
        .map_err(|e| BrowserError::EvaluationFailed(format!("Failed to measure page: {}", e)))?;
    let json = result
        .value
        .and_then(|value| value.as_str().map(str::to_string))
        .ok_or_else(|| BrowserError::EvaluationFailed("Page size script returned nothing".to_string()))?;
    let (width, height): (f64, f64) = serde_json::from_str(&json)
        .map_err(|e| BrowserError::EvaluationFailed(format!("Unexpected page size {}: {}", json, e)))?;
    Ok((width, height))
}
