//! Declarative cell styling: fonts, padding, borders, alignment.
//!
//! Lengths stored in these types are in document units; the canvas converts
//! them to millimetres once the document unit is known.

use std::str::FromStr;

use genpdf::style::Color;
use log::warn;

use crate::error::ReportError;
use crate::units::Unit;

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: u8 = 12;

/// Smallest size [`TextFit::Shrink`] will reduce a font to.
pub const MIN_FONT_SIZE: u8 = 4;

/// Default border stroke width in millimetres.
pub const DEFAULT_LINE_WIDTH_MM: f64 = 0.2;

/// Default horizontal and vertical cell padding in inches.
const DEFAULT_PADDING_IN: [f64; 2] = [0.05, 0.025];

const BLACK: Color = Color::Rgb(0, 0, 0);

/// Font used for cell text.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSettings {
    family: Option<String>,
    size: u8,
    bold: bool,
    italic: bool,
    underline: bool,
    color: Color,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            family: None,
            size: DEFAULT_FONT_SIZE,
            bold: false,
            italic: false,
            underline: false,
            color: BLACK,
        }
    }
}

impl FontSettings {
    /// Creates the default font: default family, 12pt, regular, black.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the registered family name, `None` for the default family.
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    /// Returns the font size in points.
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Returns whether the font is bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns whether the font is italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns whether text is underlined.
    pub fn is_underlined(&self) -> bool {
        self.underline
    }

    /// Returns the text color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Selects a font family registered on the surface.
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Sets the size in points.
    pub fn with_size(mut self, size: u8) -> Self {
        self.size = size;
        self
    }

    /// Sets the text color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Marks the font as bold.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Marks the font as italic.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Marks the text as underlined.
    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Replaces the style flags from a string of `B`, `I` and `U` letters.
    ///
    /// An empty string selects the regular style.  Unknown letters are ignored.
    pub fn with_style(mut self, style: &str) -> Self {
        self.bold = false;
        self.italic = false;
        self.underline = false;
        for letter in style.chars() {
            match letter.to_ascii_uppercase() {
                'B' => self.bold = true,
                'I' => self.italic = true,
                'U' => self.underline = true,
                other => warn!("Ignoring unknown font style letter '{}'", other),
            }
        }
        self
    }
}

/// Resolved per-side distances in millimetres.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeInsets {
    /// Left inset.
    pub left: f64,
    /// Top inset.
    pub top: f64,
    /// Right inset.
    pub right: f64,
    /// Bottom inset.
    pub bottom: f64,
}

impl EdgeInsets {
    /// Sum of the left and right insets.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of the top and bottom insets.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Cell padding in document units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Padding {
    /// Same padding on every side.
    Uniform(f64),
    /// Horizontal padding left/right, vertical padding top/bottom.
    Symmetric {
        /// Left and right padding.
        horizontal: f64,
        /// Top and bottom padding.
        vertical: f64,
    },
    /// Explicit value for each side.
    Sides {
        /// Left padding.
        left: f64,
        /// Top padding.
        top: f64,
        /// Right padding.
        right: f64,
        /// Bottom padding.
        bottom: f64,
    },
}

impl Padding {
    /// Resolves the padding to millimetres.
    pub fn to_mm(self, unit: Unit) -> EdgeInsets {
        let (left, top, right, bottom) = match self {
            Padding::Uniform(value) => (value, value, value, value),
            Padding::Symmetric {
                horizontal,
                vertical,
            } => (horizontal, vertical, horizontal, vertical),
            Padding::Sides {
                left,
                top,
                right,
                bottom,
            } => (left, top, right, bottom),
        };
        EdgeInsets {
            left: unit.to_mm(left),
            top: unit.to_mm(top),
            right: unit.to_mm(right),
            bottom: unit.to_mm(bottom),
        }
    }

    /// Built-in cell padding, independent of the document unit.
    pub fn default_mm() -> EdgeInsets {
        Padding::Symmetric {
            horizontal: DEFAULT_PADDING_IN[0],
            vertical: DEFAULT_PADDING_IN[1],
        }
        .to_mm(Unit::Inch)
    }
}

impl From<f64> for Padding {
    fn from(value: f64) -> Self {
        Padding::Uniform(value)
    }
}

/// `[horizontal, vertical]`
impl From<[f64; 2]> for Padding {
    fn from(values: [f64; 2]) -> Self {
        Padding::Symmetric {
            horizontal: values[0],
            vertical: values[1],
        }
    }
}

/// `[left, top, right, bottom]`
impl From<[f64; 4]> for Padding {
    fn from(values: [f64; 4]) -> Self {
        Padding::Sides {
            left: values[0],
            top: values[1],
            right: values[2],
            bottom: values[3],
        }
    }
}

/// Border stroke in document units.  A missing width keeps the current width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    width: Option<f64>,
    color: Color,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            width: None,
            color: BLACK,
        }
    }
}

impl LineStyle {
    /// Creates a black stroke with the current width.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stroke width in document units.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the stroke color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Returns the requested width in document units.
    pub fn width(&self) -> Option<f64> {
        self.width
    }

    /// Returns the stroke color.
    pub fn color(&self) -> Color {
        self.color
    }

    pub(crate) fn to_stroke(self, unit: Unit, fallback: Stroke) -> Stroke {
        Stroke {
            width_mm: self
                .width
                .map(|width| unit.to_mm(width))
                .unwrap_or(fallback.width_mm),
            color: self.color,
        }
    }
}

/// A stroke resolved to millimetres, as handed to the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    /// Width in millimetres.
    pub width_mm: f64,
    /// Stroke color.
    pub color: Color,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width_mm: DEFAULT_LINE_WIDTH_MM,
            color: BLACK,
        }
    }
}

/// Which sides of a cell receive a border line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Border {
    /// Left side.
    pub left: bool,
    /// Top side.
    pub top: bool,
    /// Right side.
    pub right: bool,
    /// Bottom side.
    pub bottom: bool,
}

impl Border {
    /// No border.
    pub const NONE: Border = Border {
        left: false,
        top: false,
        right: false,
        bottom: false,
    };

    /// Frame on all four sides.
    pub const ALL: Border = Border {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };

    /// Returns whether no side is drawn.
    pub fn is_empty(&self) -> bool {
        *self == Border::NONE
    }
}

impl Default for Border {
    fn default() -> Self {
        Border::ALL
    }
}

/// Parses `"LTRB"` style side lists, `"1"` for a full frame and `"0"` or `""` for none.
impl FromStr for Border {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "0" => return Ok(Border::NONE),
            "1" => return Ok(Border::ALL),
            _ => {}
        }

        let mut border = Border::NONE;
        for side in s.trim().chars() {
            match side.to_ascii_uppercase() {
                'L' => border.left = true,
                'T' => border.top = true,
                'R' => border.right = true,
                'B' => border.bottom = true,
                _ => return Err(ReportError::invalid_option("border", s)),
            }
        }
        Ok(border)
    }
}

/// Horizontal text alignment inside a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    /// Flush left.
    #[default]
    Left,
    /// Centered between the left and right padding.
    Center,
    /// Flush right.
    Right,
    /// Justified; the last line of a paragraph stays flush left.
    Justify,
}

impl FromStr for Align {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LEFT" => Ok(Align::Left),
            "C" | "CENTER" => Ok(Align::Center),
            "R" | "RIGHT" => Ok(Align::Right),
            "J" | "JUSTIFY" => Ok(Align::Justify),
            _ => Err(ReportError::invalid_option("align", s)),
        }
    }
}

/// Vertical placement of the text block inside a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    /// Below the top padding.
    Top,
    /// Centered between the top and bottom padding.
    #[default]
    Center,
    /// Above the bottom padding.
    Bottom,
}

impl FromStr for VAlign {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "T" | "TOP" => Ok(VAlign::Top),
            "C" | "M" | "CENTER" | "MIDDLE" => Ok(VAlign::Center),
            "B" | "BOTTOM" => Ok(VAlign::Bottom),
            _ => Err(ReportError::invalid_option("valign", s)),
        }
    }
}

/// How single-line text wider than its cell is handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextFit {
    /// Cut the text at the inner width of the cell.
    #[default]
    Clip,
    /// Reduce the font size until the text fits, down to [`MIN_FONT_SIZE`].
    Shrink,
}

/// Options of a single cell ("column").
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellOptions {
    width: f64,
    height: f64,
    align: Align,
    border: Border,
    valign: VAlign,
    fit: TextFit,
    multiline: bool,
    font: Option<FontSettings>,
    padding: Option<Padding>,
    border_style: Option<LineStyle>,
}

impl CellOptions {
    /// Creates the default options: full remaining width, natural height,
    /// left aligned, vertically centered, framed on all sides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the width in document units; `0` extends the cell to the right margin.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Sets the height in document units; `0` uses the natural text height.
    ///
    /// Multi-line cells treat the height as a minimum.
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Sets the horizontal alignment.
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Sets the framed sides.
    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    /// Sets the vertical alignment.
    pub fn with_valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
        self
    }

    /// Sets the overflow handling for single-line text.
    pub fn with_fit(mut self, fit: TextFit) -> Self {
        self.fit = fit;
        self
    }

    /// Enables word wrapping.
    pub fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    /// Overrides the font for this cell.
    pub fn with_font(mut self, font: FontSettings) -> Self {
        self.font = Some(font);
        self
    }

    /// Overrides the padding for this cell.
    pub fn with_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = Some(padding.into());
        self
    }

    /// Overrides the border stroke for this cell.
    pub fn with_border_style(mut self, style: LineStyle) -> Self {
        self.border_style = Some(style);
        self
    }

    /// Returns the requested width in document units.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns the requested height in document units.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the horizontal alignment.
    pub fn align(&self) -> Align {
        self.align
    }

    /// Returns the framed sides.
    pub fn border(&self) -> Border {
        self.border
    }

    /// Returns the vertical alignment.
    pub fn valign(&self) -> VAlign {
        self.valign
    }

    /// Returns the overflow handling.
    pub fn fit(&self) -> TextFit {
        self.fit
    }

    /// Returns whether word wrapping is enabled.
    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    /// Returns the font override.
    pub fn font(&self) -> Option<&FontSettings> {
        self.font.as_ref()
    }

    /// Returns the padding override.
    pub fn padding(&self) -> Option<Padding> {
        self.padding
    }

    /// Returns the border stroke override.
    pub fn border_style(&self) -> Option<LineStyle> {
        self.border_style
    }
}
