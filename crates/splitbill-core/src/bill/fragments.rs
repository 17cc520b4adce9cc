//! Positioned text fragments and the document-wide fragment stream.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A text item as reported by a PDF text layer (pdf.js `TextItem` shape).
///
/// `transform` is the six-entry text matrix; `x` and `y` are its translation
/// components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFragment {
    /// Text content. Marked-content items carry none.
    #[serde(rename = "str", default)]
    pub text: String,

    /// Text transform `[a, b, c, d, e, f]`, when the reader supplied one.
    #[serde(default)]
    pub transform: Option<Vec<f64>>,

    /// Advance width in page units.
    #[serde(default)]
    pub width: f64,

    /// Glyph height in page units.
    #[serde(default)]
    pub height: f64,
}

impl RawFragment {
    /// Create a raw fragment positioned at `(x, y)` with an identity scale.
    pub fn at(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            transform: Some(vec![1.0, 0.0, 0.0, 1.0, x, y]),
            width: 0.0,
            height: 0.0,
        }
    }

    /// Position derived from the transform, if usable.
    fn position(&self) -> Option<(f64, f64)> {
        let transform = self.transform.as_ref()?;
        if transform.len() < 6 {
            return None;
        }
        let (x, y) = (transform[4], transform[5]);
        (x.is_finite() && y.is_finite()).then_some((x, y))
    }
}

/// A positioned run of text on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Text content.
    pub text: String,
    /// Horizontal position (left edge).
    pub x: f64,
    /// Vertical position (baseline, PDF coordinates increase upward).
    pub y: f64,
    /// Width of the run.
    pub width: f64,
    /// Height of the run.
    pub height: f64,
    /// Zero-based page index.
    pub page: u32,
}

impl Fragment {
    pub fn new(text: impl Into<String>, x: f64, y: f64, page: u32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width: 0.0,
            height: 0.0,
            page,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Build a fragment from a raw text item, dropping degenerate ones.
    pub fn from_raw(raw: RawFragment, page: u32) -> Option<Self> {
        if raw.text.is_empty() {
            return None;
        }
        let (x, y) = raw.position()?;
        Some(Self {
            text: raw.text,
            x,
            y,
            width: raw.width,
            height: raw.height,
            page,
        })
    }

    /// Whether the fragment has usable coordinates.
    pub fn is_positioned(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Flat, page-ordered sequence of fragments for a whole document.
#[derive(Debug, Clone, Default)]
pub struct FragmentStream {
    fragments: Vec<Fragment>,
    pages: u32,
    dropped: usize,
}

impl FragmentStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a stream from per-page raw fragments, in page order.
    pub fn from_pages<I, P>(pages: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: IntoIterator<Item = RawFragment>,
    {
        let mut stream = Self::new();
        for page in pages {
            stream.push_page(page);
        }
        stream
    }

    /// Append the next page's fragments.
    pub fn push_page<P>(&mut self, page: P)
    where
        P: IntoIterator<Item = RawFragment>,
    {
        let page_index = self.pages;
        let before = self.fragments.len();
        let mut seen = 0usize;

        for raw in page {
            seen += 1;
            if let Some(fragment) = Fragment::from_raw(raw, page_index) {
                self.fragments.push(fragment);
            }
        }

        let kept = self.fragments.len() - before;
        self.dropped += seen - kept;
        self.pages += 1;

        debug!(
            "Page {}: kept {} of {} fragments",
            page_index + 1,
            kept,
            seen
        );
    }

    /// Number of pages pushed so far.
    pub fn page_count(&self) -> u32 {
        self.pages
    }

    /// Number of degenerate fragments discarded.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }
}
