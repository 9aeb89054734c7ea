//! Document units, paper formats and page setup.
//!
//! All user-facing lengths are expressed in the document unit chosen by the
//! first [`PageSetup`] of a report.  Layout happens in millimetres, which is
//! also what the `genpdf` toolkit works with.

use std::str::FromStr;

use crate::error::ReportError;

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Unit used for every length passed to or returned by the report API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Unit {
    /// Millimetres.
    Millimetre,
    /// Centimetres.
    Centimetre,
    /// Inches.
    #[default]
    Inch,
    /// PostScript points (1/72 inch).
    Point,
}

impl Unit {
    fn mm_per_unit(self) -> f64 {
        match self {
            Unit::Millimetre => 1.0,
            Unit::Centimetre => 10.0,
            Unit::Inch => MM_PER_INCH,
            Unit::Point => MM_PER_INCH / POINTS_PER_INCH,
        }
    }

    /// Converts a length expressed in this unit into millimetres.
    pub fn to_mm(self, value: f64) -> f64 {
        value * self.mm_per_unit()
    }

    /// Converts a length in millimetres into this unit.
    pub fn from_mm(self, mm: f64) -> f64 {
        mm / self.mm_per_unit()
    }
}

impl FromStr for Unit {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mm" => Ok(Unit::Millimetre),
            "cm" => Ok(Unit::Centimetre),
            "in" | "inch" => Ok(Unit::Inch),
            "pt" => Ok(Unit::Point),
            _ => Err(ReportError::invalid_option("unit", s)),
        }
    }
}

/// Page orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Height greater than width.
    #[default]
    Portrait,
    /// Width greater than height.
    Landscape,
}

impl FromStr for Orientation {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "portrait" => Ok(Orientation::Portrait),
            "l" | "landscape" => Ok(Orientation::Landscape),
            _ => Err(ReportError::invalid_option("orientation", s)),
        }
    }
}

/// Paper formats understood by [`PageSetup`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PageFormat {
    /// ISO A3.
    A3,
    /// ISO A4.
    #[default]
    A4,
    /// ISO A5.
    A5,
    /// US Letter.
    Letter,
    /// US Legal.
    Legal,
    /// Arbitrary portrait size in millimetres.
    Custom {
        /// Width in millimetres.
        width_mm: f64,
        /// Height in millimetres.
        height_mm: f64,
    },
}

impl PageFormat {
    /// Returns the portrait `(width, height)` of the format in millimetres.
    pub fn size_mm(self) -> (f64, f64) {
        match self {
            PageFormat::A3 => (297.0, 420.0),
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A5 => (148.0, 210.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
            PageFormat::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }
}

impl FromStr for PageFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a3" => Ok(PageFormat::A3),
            "a4" => Ok(PageFormat::A4),
            "a5" => Ok(PageFormat::A5),
            "letter" => Ok(PageFormat::Letter),
            "legal" => Ok(PageFormat::Legal),
            _ => Err(ReportError::invalid_option("page format", s)),
        }
    }
}

/// Page margins in document units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    /// Left margin.
    pub left: f64,
    /// Top margin.
    pub top: f64,
    /// Right margin.
    pub right: f64,
    /// Bottom margin.
    pub bottom: f64,
}

impl Margins {
    /// Creates margins from the four sides.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates margins with the same value on every side.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub(crate) fn to_mm(self, unit: Unit) -> Margins {
        Margins::new(
            unit.to_mm(self.left),
            unit.to_mm(self.top),
            unit.to_mm(self.right),
            unit.to_mm(self.bottom),
        )
    }

    pub(crate) fn from_mm(self, unit: Unit) -> Margins {
        Margins::new(
            unit.from_mm(self.left),
            unit.from_mm(self.top),
            unit.from_mm(self.right),
            unit.from_mm(self.bottom),
        )
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(0.5)
    }
}

impl From<f64> for Margins {
    fn from(value: f64) -> Self {
        Self::uniform(value)
    }
}

/// `[left, top, right, bottom]`
impl From<[f64; 4]> for Margins {
    fn from(sides: [f64; 4]) -> Self {
        Self::new(sides[0], sides[1], sides[2], sides[3])
    }
}

/// Arguments of a page start band.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageSetup {
    format: PageFormat,
    orientation: Orientation,
    unit: Unit,
    margins: Margins,
}

impl PageSetup {
    /// Creates the default setup: A4 portrait, inches, half-inch margins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the paper format.
    pub fn format(&self) -> PageFormat {
        self.format
    }

    /// Returns the orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns the document unit requested by this setup.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Returns the margins in document units.
    pub fn margins(&self) -> Margins {
        self.margins
    }

    /// Sets the paper format and returns the updated setup.
    pub fn with_format(mut self, format: PageFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the orientation and returns the updated setup.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets the document unit and returns the updated setup.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Sets the margins and returns the updated setup.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = margins.into();
        self
    }

    /// Returns the `(width, height)` of the page in millimetres.
    pub fn page_size_mm(&self) -> (f64, f64) {
        let (width, height) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        }
    }
}
