//! Banded PDF reports on top of `genpdf`.
//!
//! A [`Report`] is an ordered list of bands: page starts and ends, page
//! headers, bodies and footers, and master data bands that repeat over a
//! dataset stored as a report variable.  Band callbacks draw declarative cells
//! through a [`Canvas`], which breaks pages automatically when a cell would
//! cross the bottom margin.

pub mod bands;
pub mod canvas;
pub mod error;
pub mod fonts;
pub mod report;
pub mod samples;
pub mod style;
pub mod surface;
pub mod text;
pub mod units;
pub mod variables;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use bands::{Band, BandKind};
pub use canvas::{Bookmark, Canvas};
pub use error::ReportError;
pub use report::{RenderedReport, Report};
pub use style::{
    Align, Border, CellOptions, FontSettings, LineStyle, Padding, TextFit, VAlign,
};
pub use surface::{GenpdfSurface, RecordingSurface, Surface};
pub use units::{Margins, Orientation, PageFormat, PageSetup, Unit};
pub use variables::Variables;

/// Colour type used by [`FontSettings`] and [`LineStyle`].
pub use genpdf::style::Color;
