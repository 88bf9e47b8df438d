//! Clipboard payload codec and clipboard backends.
//!
//! Copied paths travel as an HTML fragment holding a single element whose
//! `data-inkboard-paths` attribute carries base64-encoded MessagePack: an
//! array of records with the fields of [`ClipboardRecord`]. Ids and caches
//! are not part of the payload; decoded paths always get fresh ids.

use crate::path::{InkColor, Path};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attribute carrying the payload.
pub const PAYLOAD_ATTRIBUTE: &str = "data-inkboard-paths";

/// Errors that can occur while moving paths through the clipboard.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("No data-inkboard-paths payload found")]
    MissingPayload,
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid MessagePack payload: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("Failed to encode payload: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("Invalid path record {index}: {reason}")]
    Invalid { index: usize, reason: String },
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// One path as it appears in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ClipboardRecord {
    /// CSS hex color.
    pub color: String,
    pub width: f64,
    /// Interleaved coordinates `[x0, y0, x1, y1, ...]`.
    pub points: Vec<f64>,
    pub offset_x: f64,
    pub offset_y: f64,
    pub is_bezier: bool,
    pub timestamp: u64,
}

impl From<&Path> for ClipboardRecord {
    fn from(path: &Path) -> Self {
        Self {
            color: path.color.to_hex(),
            width: path.width(),
            points: path.points().iter().flat_map(|p| [p.x, p.y]).collect(),
            offset_x: path.offset().x,
            offset_y: path.offset().y,
            is_bezier: path.is_bezier,
            timestamp: path.timestamp,
        }
    }
}

impl ClipboardRecord {
    /// Validate the record and rebuild a path with a fresh id.
    pub fn into_path(self, index: usize) -> Result<Path, ClipboardError> {
        let invalid = |reason: String| ClipboardError::Invalid { index, reason };

        let color = InkColor::from_hex(&self.color).ok_or_else(|| invalid(format!("color {:?}", self.color)))?;
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(invalid(format!("width {}", self.width)));
        }
        if self.points.is_empty() || self.points.len() % 2 != 0 {
            return Err(invalid(format!("{} coordinates", self.points.len())));
        }
        if !self.points.iter().all(|v| v.is_finite()) {
            return Err(invalid("non-finite coordinate".to_string()));
        }
        if !(self.offset_x.is_finite() && self.offset_y.is_finite()) {
            return Err(invalid("non-finite offset".to_string()));
        }

        let points = self.points.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect();
        let mut path = Path::new(color, self.width);
        path.set_points(points, self.is_bezier);
        path.set_offset(Vec2::new(self.offset_x, self.offset_y));
        path.timestamp = self.timestamp;
        Ok(path)
    }
}

/// Encode paths as a clipboard HTML fragment.
pub fn encode(paths: &[Path]) -> Result<String, ClipboardError> {
    let records: Vec<ClipboardRecord> = paths.iter().map(ClipboardRecord::from).collect();
    let packed = rmp_serde::to_vec_named(&records)?;
    let payload = STANDARD.encode(packed);
    Ok(format!(r#"<meta charset="utf-8"><div {PAYLOAD_ATTRIBUTE}="{payload}"></div>"#))
}

/// Decode paths from clipboard HTML. Any malformed record rejects the whole payload.
pub fn decode(html: &str) -> Result<Vec<Path>, ClipboardError> {
    let payload = extract_payload(html).ok_or(ClipboardError::MissingPayload)?;
    let packed = STANDARD.decode(payload.trim())?;
    let records: Vec<ClipboardRecord> = rmp_serde::from_slice(&packed)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_path(index))
        .collect()
}

/// Value of the payload attribute, with either quote style.
fn extract_payload(html: &str) -> Option<&str> {
    let start = html.find(PAYLOAD_ATTRIBUTE)? + PAYLOAD_ATTRIBUTE.len();
    let rest = html[start..].trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &rest[1..];
    let end = value.find(quote)?;
    Some(&value[..end])
}

/// Where encoded clipboard content is written to and read from.
pub trait ClipboardBackend {
    fn write_html(&mut self, html: &str) -> Result<(), ClipboardError>;
    fn read_html(&mut self) -> Result<Option<String>, ClipboardError>;
}

/// Process-local clipboard. Clones share the same content.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    content: std::rc::Rc<std::cell::RefCell<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put arbitrary content on the clipboard.
    pub fn set_content(&self, content: impl Into<String>) {
        *self.content.borrow_mut() = Some(content.into());
    }

    pub fn content(&self) -> Option<String> {
        self.content.borrow().clone()
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn write_html(&mut self, html: &str) -> Result<(), ClipboardError> {
        self.set_content(html);
        Ok(())
    }

    fn read_html(&mut self) -> Result<Option<String>, ClipboardError> {
        Ok(self.content())
    }
}

/// The operating system clipboard.
///
/// The fragment is written as HTML with itself as the plain-text
/// alternative, and read back as text.
#[cfg(all(feature = "native-clipboard", not(target_arch = "wasm32")))]
pub struct SystemClipboard {
    clipboard: arboard::Clipboard,
}

#[cfg(all(feature = "native-clipboard", not(target_arch = "wasm32")))]
impl SystemClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard = arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        Ok(Self { clipboard })
    }
}

#[cfg(all(feature = "native-clipboard", not(target_arch = "wasm32")))]
impl ClipboardBackend for SystemClipboard {
    fn write_html(&mut self, html: &str) -> Result<(), ClipboardError> {
        self.clipboard
            .set_html(html, Some(html))
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }

    fn read_html(&mut self) -> Result<Option<String>, ClipboardError> {
        match self.clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(ClipboardError::Unavailable(e.to_string())),
        }
    }
}
