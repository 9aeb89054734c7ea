//! In-memory surface with deterministic metrics.

use std::fmt::Write as _;

use super::Surface;
use crate::error::ReportError;
use crate::style::{FontSettings, Stroke};

const MM_PER_POINT: f64 = 25.4 / 72.0;
const CHAR_WIDTH_EM: f64 = 0.5;
const LINE_HEIGHT_EM: f64 = 1.25;
const GLYPH_HEIGHT_EM: f64 = 0.75;

/// A drawing operation captured by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// A page was added.
    Page {
        /// Page width in millimetres.
        width: f64,
        /// Page height in millimetres.
        height: f64,
    },
    /// A line of text was drawn.
    Text {
        /// 1-based page number.
        page: usize,
        /// Left edge of the line box.
        x: f64,
        /// Top edge of the line box.
        y: f64,
        /// Drawn text.
        text: String,
        /// Font used.
        font: FontSettings,
    },
    /// A line was stroked.
    Line {
        /// 1-based page number.
        page: usize,
        /// Start point.
        from: (f64, f64),
        /// End point.
        to: (f64, f64),
        /// Stroke used.
        stroke: Stroke,
    },
}

/// Surface that records operations instead of producing a PDF.
///
/// Every character is half an em wide and lines are 1.25 em tall, so layout
/// results can be predicted exactly.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
    pages: usize,
}

impl RecordingSurface {
    /// Creates an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded operation in order.
    pub fn operations(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Returns the texts drawn on the given 1-based page, in drawing order.
    pub fn texts_on_page(&self, page: usize) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text {
                    page: p, text, ..
                } if *p == page => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns all drawn texts paired with their page number.
    pub fn texts(&self) -> Vec<(usize, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { page, text, .. } => Some((*page, text.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Returns the stroked lines as `(page, from, to)`.
    pub fn lines(&self) -> Vec<(usize, (f64, f64), (f64, f64))> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Line { page, from, to, .. } => Some((*page, *from, *to)),
                _ => None,
            })
            .collect()
    }

    fn em(font: &FontSettings) -> f64 {
        f64::from(font.size()) * MM_PER_POINT
    }

    fn current_page(&self) -> Result<usize, ReportError> {
        if self.pages == 0 {
            Err(ReportError::NoActivePage)
        } else {
            Ok(self.pages)
        }
    }
}

impl Surface for RecordingSurface {
    fn add_page(&mut self, width_mm: f64, height_mm: f64) -> Result<(), ReportError> {
        self.pages += 1;
        self.ops.push(DrawOp::Page {
            width: width_mm,
            height: height_mm,
        });
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn text_width(&self, text: &str, font: &FontSettings) -> f64 {
        text.chars().count() as f64 * CHAR_WIDTH_EM * Self::em(font)
    }

    fn line_height(&self, font: &FontSettings) -> f64 {
        LINE_HEIGHT_EM * Self::em(font)
    }

    fn glyph_height(&self, font: &FontSettings) -> f64 {
        GLYPH_HEIGHT_EM * Self::em(font)
    }

    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        font: &FontSettings,
    ) -> Result<(), ReportError> {
        let page = self.current_page()?;
        self.ops.push(DrawOp::Text {
            page,
            x,
            y,
            text: text.to_string(),
            font: font.clone(),
        });
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        stroke: &Stroke,
    ) -> Result<(), ReportError> {
        let page = self.current_page()?;
        self.ops.push(DrawOp::Line {
            page,
            from,
            to,
            stroke: *stroke,
        });
        Ok(())
    }

    /// Returns a plain-text listing of the recorded operations.
    fn finish(&mut self) -> Result<Vec<u8>, ReportError> {
        if self.pages == 0 {
            return Err(ReportError::EmptyReport);
        }
        let mut listing = String::new();
        for op in &self.ops {
            // Writing into a String cannot fail.
            let _ = match op {
                DrawOp::Page { width, height } => {
                    writeln!(listing, "page {:.2}x{:.2}", width, height)
                }
                DrawOp::Text {
                    page, x, y, text, ..
                } => writeln!(listing, "  [{}] text ({:.2}, {:.2}) {:?}", page, x, y, text),
                DrawOp::Line { page, from, to, .. } => writeln!(
                    listing,
                    "  [{}] line ({:.2}, {:.2}) -> ({:.2}, {:.2})",
                    page, from.0, from.1, to.0, to.1
                ),
            };
        }
        Ok(listing.into_bytes())
    }
}
