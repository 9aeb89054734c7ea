//! Render-time drawing context handed to band callbacks.
//!
//! The canvas owns the cursor, the current font/padding/stroke state, open
//! rows and the page-break logic.  Lengths crossing the public API are in the
//! document unit; everything stored internally is in millimetres.

use std::rc::Rc;

use log::{debug, trace, warn};

use crate::bands::{self, Band, BandAction, BandKind};
use crate::error::ReportError;
use crate::report::ReportConfig;
use crate::style::{
    Align, Border, CellOptions, EdgeInsets, FontSettings, LineStyle, Padding, Stroke, TextFit,
    VAlign, DEFAULT_LINE_WIDTH_MM, MIN_FONT_SIZE,
};
use crate::surface::Surface;
use crate::text::{self, WrappedLine};
use crate::units::{Margins, PageSetup, Unit};
use crate::variables::Variables;

const UNDERLINE_OFFSET_MM: f64 = 0.4;

/// Slack allowed when comparing accumulated heights against the page limit.
const OVERFLOW_TOLERANCE_MM: f64 = 1e-6;

/// A named position in the rendered document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bookmark {
    /// Outline title.
    pub title: String,
    /// 1-based page number.
    pub page: usize,
}

#[derive(Clone, Copy, Debug)]
struct PageState {
    number: usize,
    width: f64,
    height: f64,
    margins: Margins,
}

struct PendingCell {
    text: String,
    options: CellOptions,
    line_break: bool,
}

struct RowState {
    max_height: f64,
    x: f64,
    cells: Vec<PendingCell>,
}

struct CellLayout {
    width: f64,
    height: f64,
    lines: Vec<WrappedLine>,
    font: FontSettings,
    padding: EdgeInsets,
    stroke: Stroke,
    line_height: f64,
    align: Align,
    valign: VAlign,
    border: Border,
    multiline: bool,
}

impl CellLayout {
    fn inner_width(&self) -> f64 {
        (self.width - self.padding.horizontal()).max(0.0)
    }
}

/// Drawing context passed to every band callback.
pub struct Canvas<'r> {
    surface: &'r mut dyn Surface,
    bands: &'r [Band],
    variables: &'r Variables,
    config: &'r ReportConfig,
    unit: Unit,
    unit_fixed: bool,
    page: Option<PageState>,
    x: f64,
    y: f64,
    current: usize,
    check_overflow: bool,
    measuring: bool,
    font: FontSettings,
    padding: EdgeInsets,
    stroke: Stroke,
    row: Option<RowState>,
    last_height: f64,
    bookmarks: Vec<Bookmark>,
}

impl<'r> Canvas<'r> {
    pub(crate) fn new(
        surface: &'r mut dyn Surface,
        bands: &'r [Band],
        variables: &'r Variables,
        config: &'r ReportConfig,
    ) -> Self {
        Self {
            surface,
            bands,
            variables,
            config,
            unit: Unit::default(),
            unit_fixed: false,
            page: None,
            x: 0.0,
            y: 0.0,
            current: 0,
            check_overflow: true,
            measuring: false,
            font: config.font.clone(),
            padding: Padding::default_mm(),
            stroke: Stroke::default(),
            row: None,
            last_height: 0.0,
            bookmarks: Vec::new(),
        }
    }

    /// Runs the band at `index` as the current band.
    pub(crate) fn dispatch(&mut self, index: usize) -> Result<(), ReportError> {
        self.current = index;
        trace!("Dispatching band {} ({:?})", index, self.bands[index].kind());
        self.call_band(index)
    }

    /// Finalises the surface, returning its bytes, page count and bookmarks.
    pub(crate) fn finish(self) -> Result<(Vec<u8>, usize, Vec<Bookmark>), ReportError> {
        if self.row.is_some() {
            warn!("Report finished with an open row; its cells were not drawn");
        }
        let pages = self.surface.page_count();
        let bytes = self.surface.finish()?;
        Ok((bytes, pages, self.bookmarks))
    }

    fn call_band(&mut self, index: usize) -> Result<(), ReportError> {
        let bands = self.bands;
        match &bands[index].action {
            BandAction::PageStart(setup) => self.start_page(setup),
            BandAction::PageEnd => {
                self.end_page();
                Ok(())
            }
            BandAction::Callback(callback) => callback(self),
        }
    }

    fn invoke_ancestor(&mut self, kind: BandKind) -> Result<(), ReportError> {
        match bands::ancestor(self.bands, self.current, kind) {
            Some(index) => self.call_band(index),
            None => Ok(()),
        }
    }

    fn default_padding(&self) -> EdgeInsets {
        self.config
            .padding
            .map(|padding| padding.to_mm(self.unit))
            .unwrap_or_else(Padding::default_mm)
    }

    fn default_stroke(&self) -> Stroke {
        Stroke {
            width_mm: self
                .config
                .line_width
                .map(|width| self.unit.to_mm(width))
                .unwrap_or(DEFAULT_LINE_WIDTH_MM),
            ..Stroke::default()
        }
    }

    fn start_page(&mut self, setup: &PageSetup) -> Result<(), ReportError> {
        if !self.unit_fixed {
            self.unit = setup.unit();
            self.unit_fixed = true;
            self.padding = self.default_padding();
            self.stroke = self.default_stroke();
        } else if setup.unit() != self.unit {
            warn!(
                "Page start requests {:?} but the document unit is {:?}; keeping {:?}",
                setup.unit(),
                self.unit,
                self.unit
            );
        }

        let (width, height) = setup.page_size_mm();
        self.surface.add_page(width, height)?;
        let margins = setup.margins().to_mm(self.unit);
        let number = self.surface.page_count();
        debug!("Starting page {} ({:.1} x {:.1} mm)", number, width, height);
        self.page = Some(PageState {
            number,
            width,
            height,
            margins,
        });

        self.check_overflow = false;
        self.x = margins.left;
        self.y = 0.0;
        self.invoke_ancestor(BandKind::PageHeader)?;

        self.x = margins.left;
        self.y = height - margins.bottom;
        self.invoke_ancestor(BandKind::PageFooter)?;

        self.x = margins.left;
        self.y = margins.top;
        self.check_overflow = true;
        Ok(())
    }

    fn end_page(&mut self) {
        if let Some(page) = self.page.take() {
            debug!("Closing page {}", page.number);
        }
        if self.row.take().is_some() {
            warn!("Page ended with an open row; discarding its cells");
        }
    }

    fn active_page(&self) -> Result<PageState, ReportError> {
        self.page.ok_or(ReportError::NoActivePage)
    }

    /// Prints the band of `kind` governing the current band, with page-break
    /// checks suspended.  Does nothing when no such band is registered.
    ///
    /// An open row is set aside while the band runs and resumes afterwards.
    pub fn print_band(&mut self, kind: BandKind) -> Result<(), ReportError> {
        let previous = std::mem::replace(&mut self.check_overflow, false);
        let saved_row = self.row.take();
        let result = self.invoke_ancestor(kind);
        self.row = saved_row;
        self.check_overflow = previous;
        result
    }

    fn measure_band_mm(&mut self, kind: BandKind) -> Result<f64, ReportError> {
        let Some(index) = bands::ancestor(self.bands, self.current, kind) else {
            return Ok(0.0);
        };

        let saved_cursor = (self.x, self.y, self.last_height);
        let saved_font = self.font.clone();
        let saved_padding = self.padding;
        let saved_stroke = self.stroke;
        let saved_row = self.row.take();
        let was_measuring = std::mem::replace(&mut self.measuring, true);
        let was_checking = std::mem::replace(&mut self.check_overflow, false);

        let start = self.y;
        let result = self.call_band(index);
        let height = self.y - start;

        (self.x, self.y, self.last_height) = saved_cursor;
        self.font = saved_font;
        self.padding = saved_padding;
        self.stroke = saved_stroke;
        self.row = saved_row;
        self.measuring = was_measuring;
        self.check_overflow = was_checking;

        result.map(|()| height)
    }

    /// Height the band of `kind` would take if printed at the cursor.
    ///
    /// The band runs in measuring mode: nothing is drawn and the cursor and
    /// formatting state are restored afterwards.
    pub fn measure_band(&mut self, kind: BandKind) -> Result<f64, ReportError> {
        let height = self.measure_band_mm(kind)?;
        Ok(self.unit.from_mm(height))
    }

    /// Returns `true` when a page break was performed.
    fn ensure_room(&mut self, height: f64) -> Result<bool, ReportError> {
        if !self.check_overflow || self.measuring {
            return Ok(false);
        }

        let page = self.active_page()?;
        let in_master = self.current_band() == Some(BandKind::MasterData);
        let mut limit = page.height - page.margins.bottom;
        if in_master {
            limit -= self.measure_band_mm(BandKind::MasterFooter)?;
        }

        if self.y + height <= limit + OVERFLOW_TOLERANCE_MM {
            return Ok(false);
        }

        debug!(
            "Content of {:.2} mm at y={:.2} mm crosses {:.2} mm on page {}; breaking page",
            height, self.y, limit, page.number
        );
        self.break_page(in_master)?;
        Ok(true)
    }

    fn break_page(&mut self, in_master: bool) -> Result<(), ReportError> {
        let saved_row = self.row.take();
        let result = self.run_page_break(in_master);
        self.row = saved_row;
        result
    }

    fn run_page_break(&mut self, in_master: bool) -> Result<(), ReportError> {
        if in_master {
            self.print_band(BandKind::MasterFooter)?;
        }
        let start = bands::ancestor(self.bands, self.current, BandKind::PageStart)
            .ok_or(ReportError::NoActivePage)?;
        self.call_band(start)?;
        if in_master {
            self.print_band(BandKind::MasterHeader)?;
        }
        Ok(())
    }

    /// Starts a new page from the governing page start band.
    ///
    /// Inside a master data band the master footer is printed first and the
    /// master header is repeated on the new page.  Cells of an open row stay
    /// pending and are drawn on the new page by [`Canvas::end_row`].  Does
    /// nothing while a band is being measured.
    pub fn page_break(&mut self) -> Result<(), ReportError> {
        if self.measuring {
            return Ok(());
        }
        self.active_page()?;
        let in_master = self.current_band() == Some(BandKind::MasterData);
        self.break_page(in_master)
    }

    /// Draws a cell at the cursor.
    ///
    /// With `line_break` the cursor moves to the left margin below the cell,
    /// otherwise it moves to the right edge of the cell.  Inside a row the cell
    /// is only measured; it is drawn by [`Canvas::end_row`].
    pub fn column(
        &mut self,
        text: impl AsRef<str>,
        options: &CellOptions,
        line_break: bool,
    ) -> Result<(), ReportError> {
        let text = text.as_ref();
        let page = self.active_page()?;

        if let Some(row_x) = self.row.as_ref().map(|row| row.x) {
            let layout = self.layout_cell(text, options, row_x, None)?;
            if let Some(row) = self.row.as_mut() {
                row.max_height = row.max_height.max(layout.height);
                row.x = if line_break {
                    page.margins.left
                } else {
                    row_x + layout.width
                };
                row.cells.push(PendingCell {
                    text: text.to_string(),
                    options: options.clone(),
                    line_break,
                });
            }
            return Ok(());
        }

        let mut layout = self.layout_cell(text, options, self.x, None)?;
        if self.ensure_room(layout.height)? {
            layout = self.layout_cell(text, options, self.x, None)?;
        }
        self.place_cell(&layout, line_break)
    }

    /// Height a cell would take at the cursor, in document units.
    pub fn measure_column(
        &self,
        text: impl AsRef<str>,
        options: &CellOptions,
    ) -> Result<f64, ReportError> {
        let layout = self.layout_cell(text.as_ref(), options, self.x, None)?;
        Ok(self.unit.from_mm(layout.height))
    }

    /// Opens a row: following cells share the height of the tallest one.
    pub fn start_row(&mut self) {
        if self.row.is_some() {
            warn!("start_row called while a row is already open; ignoring");
            return;
        }
        self.row = Some(RowState {
            max_height: 0.0,
            x: self.x,
            cells: Vec::new(),
        });
    }

    /// Closes the open row and draws its cells with the common height.
    ///
    /// The whole row moves to a new page when it does not fit.
    pub fn end_row(&mut self) -> Result<(), ReportError> {
        let Some(row) = self.row.take() else {
            warn!("end_row called without an open row");
            return Ok(());
        };

        self.ensure_room(row.max_height)?;
        for cell in row.cells {
            let layout =
                self.layout_cell(&cell.text, &cell.options, self.x, Some(row.max_height))?;
            self.place_cell(&layout, cell.line_break)?;
        }
        Ok(())
    }

    /// Whether a row is currently open.
    pub fn in_row(&self) -> bool {
        self.row.is_some()
    }

    fn layout_cell(
        &self,
        text: &str,
        options: &CellOptions,
        x: f64,
        forced_height: Option<f64>,
    ) -> Result<CellLayout, ReportError> {
        let page = self.active_page()?;
        let unit = self.unit;

        let font = options
            .font()
            .cloned()
            .unwrap_or_else(|| self.font.clone());
        let padding = options
            .padding()
            .map(|padding| padding.to_mm(unit))
            .unwrap_or(self.padding);
        let stroke = options
            .border_style()
            .map(|style| style.to_stroke(unit, self.stroke))
            .unwrap_or(self.stroke);

        let width = if options.width() > 0.0 {
            unit.to_mm(options.width())
        } else {
            (page.width - page.margins.right - x).max(0.0)
        };
        let inner_width = (width - padding.horizontal()).max(0.0);

        let (lines, font) = if options.is_multiline() {
            let lines = text::wrap_lines(text, inner_width, |s| {
                self.surface.text_width(s, &font)
            });
            (lines, font)
        } else {
            self.fit_single_line(text, inner_width, font, options.fit())
        };

        let line_height = self.surface.line_height(&font);
        let natural = line_height * lines.len() as f64 + padding.vertical();
        let requested = forced_height.unwrap_or_else(|| unit.to_mm(options.height()));
        let height = if requested <= 0.0 {
            natural
        } else if options.is_multiline() {
            requested.max(natural)
        } else {
            requested
        };

        Ok(CellLayout {
            width,
            height,
            lines,
            font,
            padding,
            stroke,
            line_height,
            align: options.align(),
            valign: options.valign(),
            border: options.border(),
            multiline: options.is_multiline(),
        })
    }

    fn fit_single_line(
        &self,
        text: &str,
        inner_width: f64,
        mut font: FontSettings,
        fit: TextFit,
    ) -> (Vec<WrappedLine>, FontSettings) {
        let text = text.replace(|c: char| c == '\n' || c == '\r', " ");

        if fit == TextFit::Shrink {
            while font.size() > MIN_FONT_SIZE && self.surface.text_width(&text, &font) > inner_width
            {
                let size = font.size() - 1;
                font = font.with_size(size);
            }
        }

        let line = text::truncate_to_width(&text, inner_width, |s| {
            self.surface.text_width(s, &font)
        });
        let line = WrappedLine {
            text: line,
            ends_paragraph: true,
        };
        (vec![line], font)
    }

    fn place_cell(&mut self, layout: &CellLayout, line_break: bool) -> Result<(), ReportError> {
        let page = self.active_page()?;
        if !self.measuring {
            self.draw_cell(layout)?;
        }
        self.last_height = layout.height;
        if line_break {
            self.x = page.margins.left;
            self.y += layout.height;
        } else {
            self.x += layout.width;
        }
        Ok(())
    }

    fn draw_cell(&mut self, layout: &CellLayout) -> Result<(), ReportError> {
        let (x, y) = (self.x, self.y);
        let padding = layout.padding;
        let block = layout.line_height * layout.lines.len() as f64;

        let inner_height = (layout.height - padding.vertical()).max(0.0);

        let mut line_y = match layout.valign {
            VAlign::Top => y + padding.top,
            VAlign::Center => y + padding.top + (inner_height - block) / 2.0,
            VAlign::Bottom => y + layout.height - padding.bottom - block,
        };

        for wrapped in &layout.lines {
            let line = wrapped.text.as_str();
            let line_width = self.surface.text_width(line, &layout.font);
            // The last line of a paragraph stays flush left.
            let justify =
                layout.align == Align::Justify && layout.multiline && !wrapped.ends_paragraph;
            let gap = if justify {
                text::justify_gap(line, layout.inner_width(), |s| {
                    self.surface.text_width(s, &layout.font)
                })
            } else {
                None
            };

            match gap {
                Some(extra) => self.draw_justified(x + padding.left, line_y, line, extra, layout)?,
                None => {
                    let line_x = match layout.align {
                        Align::Center => {
                            x + padding.left + (layout.inner_width() - line_width) / 2.0
                        }
                        Align::Right => x + layout.width - padding.right - line_width,
                        Align::Left | Align::Justify => x + padding.left,
                    };
                    self.draw_text_line(line_x, line_y, line, &layout.font, line_width)?;
                }
            }
            line_y += layout.line_height;
        }

        self.draw_border(x, y, layout.width, layout.height, layout.border, &layout.stroke)
    }

    fn draw_justified(
        &mut self,
        x: f64,
        y: f64,
        line: &str,
        extra: f64,
        layout: &CellLayout,
    ) -> Result<(), ReportError> {
        let space = self.surface.text_width(" ", &layout.font);
        let mut cursor = x;
        for word in line.split_whitespace() {
            let width = self.surface.text_width(word, &layout.font);
            self.draw_text_line(cursor, y, word, &layout.font, width)?;
            cursor += width + space + extra;
        }
        Ok(())
    }

    fn draw_text_line(
        &mut self,
        x: f64,
        y: f64,
        line: &str,
        font: &FontSettings,
        width: f64,
    ) -> Result<(), ReportError> {
        if line.is_empty() {
            return Ok(());
        }
        self.surface.draw_text(x, y, line, font)?;
        if font.is_underlined() {
            let baseline = y + self.surface.glyph_height(font) + UNDERLINE_OFFSET_MM;
            let stroke = Stroke {
                width_mm: self.stroke.width_mm,
                color: font.color(),
            };
            self.surface
                .draw_line((x, baseline), (x + width, baseline), &stroke)?;
        }
        Ok(())
    }

    fn draw_border(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        border: Border,
        stroke: &Stroke,
    ) -> Result<(), ReportError> {
        let (right, bottom) = (x + width, y + height);
        if border.top {
            self.surface.draw_line((x, y), (right, y), stroke)?;
        }
        if border.right {
            self.surface.draw_line((right, y), (right, bottom), stroke)?;
        }
        if border.bottom {
            self.surface.draw_line((x, bottom), (right, bottom), stroke)?;
        }
        if border.left {
            self.surface.draw_line((x, y), (x, bottom), stroke)?;
        }
        Ok(())
    }

    /// Current horizontal position.
    pub fn x(&self) -> f64 {
        self.unit.from_mm(self.x)
    }

    /// Current vertical position.
    pub fn y(&self) -> f64 {
        self.unit.from_mm(self.y)
    }

    /// Moves the cursor horizontally.
    pub fn set_x(&mut self, x: f64) {
        self.x = self.unit.to_mm(x);
    }

    /// Moves the cursor vertically.
    pub fn set_y(&mut self, y: f64) {
        self.y = self.unit.to_mm(y);
    }

    /// Moves the cursor.
    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.set_x(x);
        self.set_y(y);
    }

    /// Moves to the left margin of the next line.
    ///
    /// Without an explicit height the cursor advances by the height of the
    /// last drawn cell.
    pub fn line_break(&mut self, height: Option<f64>) {
        if let Some(page) = self.page {
            self.x = page.margins.left;
        }
        self.y += height
            .map(|height| self.unit.to_mm(height))
            .unwrap_or(self.last_height);
    }

    /// 1-based number of the current page, `0` before the first page.
    pub fn page_number(&self) -> usize {
        self.page.map_or(0, |page| page.number)
    }

    /// Width of the current page.
    pub fn page_width(&self) -> f64 {
        self.page.map_or(0.0, |page| self.unit.from_mm(page.width))
    }

    /// Height of the current page.
    pub fn page_height(&self) -> f64 {
        self.page.map_or(0.0, |page| self.unit.from_mm(page.height))
    }

    /// Margins of the current page.
    pub fn margins(&self) -> Margins {
        self.page
            .map_or(Margins::uniform(0.0), |page| page.margins.from_mm(self.unit))
    }

    /// Document unit.
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Kind of the band being dispatched by the render loop.
    pub fn current_band(&self) -> Option<BandKind> {
        self.bands.get(self.current).map(Band::kind)
    }

    /// Whether the canvas is measuring a band instead of drawing it.
    pub fn is_measuring(&self) -> bool {
        self.measuring
    }

    /// Reads a report variable.
    pub fn variable<T: 'static>(&self, name: &str) -> Result<Rc<T>, ReportError> {
        self.variables.get(name)
    }

    /// Records an outline entry pointing at the current page.
    pub fn bookmark(&mut self, title: impl Into<String>) {
        if self.measuring {
            return;
        }
        if let Some(page) = self.page {
            self.bookmarks.push(Bookmark {
                title: title.into(),
                page: page.number,
            });
        }
    }

    /// Current font.
    pub fn font(&self) -> &FontSettings {
        &self.font
    }

    /// Sets the font used by cells without a font override.
    pub fn set_font(&mut self, font: FontSettings) {
        self.font = font;
    }

    /// Restores the report's default font.
    pub fn reset_font(&mut self) {
        self.font = self.config.font.clone();
    }

    /// Sets the padding used by cells without a padding override.
    pub fn set_cell_padding(&mut self, padding: impl Into<Padding>) {
        self.padding = padding.into().to_mm(self.unit);
    }

    /// Restores the report's default cell padding.
    pub fn reset_cell_padding(&mut self) {
        self.padding = self.default_padding();
    }

    /// Sets the stroke used for borders and primitives.
    pub fn set_line_style(&mut self, style: LineStyle) {
        self.stroke = style.to_stroke(self.unit, self.stroke);
    }

    /// Restores the report's default stroke.
    pub fn reset_line_style(&mut self) {
        self.stroke = self.default_stroke();
    }

    /// Makes the font, padding and border style of `options` the current state.
    pub fn format_column(&mut self, options: &CellOptions) {
        if let Some(font) = options.font() {
            self.set_font(font.clone());
        }
        if let Some(padding) = options.padding() {
            self.set_cell_padding(padding);
        }
        if let Some(style) = options.border_style() {
            self.set_line_style(style);
        }
    }

    /// Restores the default font, padding and stroke.
    pub fn format_column_to_default(&mut self) {
        self.reset_font();
        self.reset_cell_padding();
        self.reset_line_style();
    }

    /// Draws text with its line box at `(x, y)` using the current font.
    pub fn text(&mut self, x: f64, y: f64, text: &str) -> Result<(), ReportError> {
        self.active_page()?;
        if self.measuring {
            return Ok(());
        }
        let font = self.font.clone();
        let width = self.surface.text_width(text, &font);
        self.draw_text_line(self.unit.to_mm(x), self.unit.to_mm(y), text, &font, width)
    }

    /// Strokes a line with the current line style.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), ReportError> {
        self.active_page()?;
        if self.measuring {
            return Ok(());
        }
        let unit = self.unit;
        let stroke = self.stroke;
        self.surface.draw_line(
            (unit.to_mm(x1), unit.to_mm(y1)),
            (unit.to_mm(x2), unit.to_mm(y2)),
            &stroke,
        )
    }

    /// Strokes a rectangle outline with the current line style.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), ReportError> {
        self.active_page()?;
        if self.measuring {
            return Ok(());
        }
        let unit = self.unit;
        let stroke = self.stroke;
        self.draw_border(
            unit.to_mm(x),
            unit.to_mm(y),
            unit.to_mm(width),
            unit.to_mm(height),
            Border::ALL,
            &stroke,
        )
    }
}
