//! Drawing surfaces that the report canvas lays out onto.
//!
//! A [`Surface`] owns the pages of the output document and provides the font
//! metrics needed for layout.  [`GenpdfSurface`] produces real PDF output via
//! `genpdf`; [`RecordingSurface`] keeps an in-memory list of drawing
//! operations, which is handy for tests and dry layout runs.
//!
//! Coordinates are millimetres measured from the top-left corner of the
//! current page, with `y` growing downwards.

mod pdf;
mod record;

pub use pdf::GenpdfSurface;
pub use record::{DrawOp, RecordingSurface};

use crate::error::ReportError;
use crate::style::{FontSettings, Stroke};

/// Backend that turns layout decisions into pages.
pub trait Surface {
    /// Appends a page of the given size and makes it the drawing target.
    fn add_page(&mut self, width_mm: f64, height_mm: f64) -> Result<(), ReportError>;

    /// Number of pages created so far.
    fn page_count(&self) -> usize;

    /// Width of `text` rendered in `font`.
    fn text_width(&self, text: &str, font: &FontSettings) -> f64;

    /// Height of one line of text in `font`.
    fn line_height(&self, font: &FontSettings) -> f64;

    /// Distance between the top of the line box and the baseline.
    fn glyph_height(&self, font: &FontSettings) -> f64;

    /// Draws a single line of text with its line box starting at `(x, y)`.
    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        font: &FontSettings,
    ) -> Result<(), ReportError>;

    /// Strokes a straight line.
    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        stroke: &Stroke,
    ) -> Result<(), ReportError>;

    /// Finalizes the document and returns its encoded bytes.
    fn finish(&mut self) -> Result<Vec<u8>, ReportError>;
}
