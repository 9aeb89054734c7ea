//! `genpdf`-backed surface.

use std::collections::HashMap;

use genpdf::fonts::{Font, FontCache, FontData, FontFamily};
use genpdf::render::Renderer;
use genpdf::style::Style;
use genpdf::{Mm, Position, Size};
use log::debug;

use super::Surface;
use crate::error::ReportError;
use crate::fonts;
use crate::style::{FontSettings, Stroke, DEFAULT_LINE_WIDTH_MM};

fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Surface that renders into a `genpdf` document.
///
/// The underlying [`Renderer`] is created lazily by the first page so that the
/// first page start decides the initial page size.  Fonts are embedded at that
/// point too, which is why additional families must be registered before it.
///
/// Lines are stroked with their color only.  genpdf areas draw every line at
/// the PDF default width, so [`Report::with_default_line_width`] and
/// [`LineStyle::with_width`] have no effect on this surface; the requested
/// width is still used for layout and reported by [`RecordingSurface`].
///
/// [`Report::with_default_line_width`]: crate::Report::with_default_line_width
/// [`LineStyle::with_width`]: crate::style::LineStyle::with_width
/// [`RecordingSurface`]: crate::RecordingSurface
pub struct GenpdfSurface {
    title: String,
    renderer: Option<Renderer>,
    font_cache: FontCache,
    families: HashMap<String, FontFamily<Font>>,
    pages: usize,
    width_ignored: bool,
}

impl GenpdfSurface {
    /// Creates a surface whose default family is `default_family`.
    pub fn new(title: impl Into<String>, default_family: FontFamily<FontData>) -> Self {
        Self {
            title: title.into(),
            renderer: None,
            font_cache: FontCache::new(default_family),
            families: HashMap::new(),
            pages: 0,
            width_ignored: false,
        }
    }

    /// Creates a surface using the bundled or system fallback font family.
    pub fn with_default_fonts(title: impl Into<String>) -> Result<Self, ReportError> {
        let family = fonts::default_font_family()?;
        Ok(Self::new(title, family))
    }

    /// Registers a named font family selectable through [`FontSettings::with_family`].
    pub fn add_font_family(
        &mut self,
        name: impl Into<String>,
        family: FontFamily<FontData>,
    ) -> Result<(), ReportError> {
        let name = name.into();
        if self.renderer.is_some() {
            return Err(ReportError::LateFontRegistration(name));
        }
        let family = self.font_cache.add_font_family(family);
        self.families.insert(name, family);
        Ok(())
    }

    /// Registers a named font family and returns the updated surface.
    pub fn with_font_family(
        mut self,
        name: impl Into<String>,
        family: FontFamily<FontData>,
    ) -> Result<Self, ReportError> {
        self.add_font_family(name, family)?;
        Ok(self)
    }

    fn style(&self, font: &FontSettings) -> Style {
        let mut style = Style::new().with_font_size(font.size());
        if let Some(name) = font.family() {
            match self.families.get(name) {
                Some(family) => style.set_font_family(*family),
                None => debug!("Font family '{}' not registered; using default", name),
            }
        }
        if font.is_bold() {
            style.set_bold();
        }
        if font.is_italic() {
            style.set_italic();
        }
        style.set_color(font.color());
        style
    }
}

impl Surface for GenpdfSurface {
    fn add_page(&mut self, width_mm: f64, height_mm: f64) -> Result<(), ReportError> {
        let size = Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm));
        match &mut self.renderer {
            Some(renderer) => renderer.add_page(size),
            None => {
                let renderer = Renderer::new(size, &self.title)?;
                self.font_cache.load_pdf_fonts(&renderer)?;
                self.renderer = Some(renderer);
            }
        }
        self.pages += 1;
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn text_width(&self, text: &str, font: &FontSettings) -> f64 {
        mm_to_f64(self.style(font).str_width(&self.font_cache, text))
    }

    fn line_height(&self, font: &FontSettings) -> f64 {
        mm_to_f64(self.style(font).line_height(&self.font_cache))
    }

    fn glyph_height(&self, font: &FontSettings) -> f64 {
        let style = self.style(font);
        mm_to_f64(
            style
                .font(&self.font_cache)
                .glyph_height(style.font_size()),
        )
    }

    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        font: &FontSettings,
    ) -> Result<(), ReportError> {
        let renderer = self.renderer.as_ref().ok_or(ReportError::NoActivePage)?;
        let page = renderer
            .get_page(self.pages - 1)
            .ok_or(ReportError::NoActivePage)?;
        let area = page.first_layer().area();
        let style = self.style(font);
        let fitted = area.print_str(
            &self.font_cache,
            Position::new(mm_from_f64(x), mm_from_f64(y)),
            style,
            text,
        )?;
        if !fitted {
            debug!("Text '{}' at ({:.2}, {:.2}) exceeds the page", text, x, y);
        }
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        stroke: &Stroke,
    ) -> Result<(), ReportError> {
        let renderer = self.renderer.as_ref().ok_or(ReportError::NoActivePage)?;
        let page = renderer
            .get_page(self.pages - 1)
            .ok_or(ReportError::NoActivePage)?;
        page.first_layer().area().draw_line(
            vec![
                Position::new(mm_from_f64(from.0), mm_from_f64(from.1)),
                Position::new(mm_from_f64(to.0), mm_from_f64(to.1)),
            ],
            Style::new().with_color(stroke.color),
        );
        if !self.width_ignored && (stroke.width_mm - DEFAULT_LINE_WIDTH_MM).abs() > f64::EPSILON {
            debug!(
                "Line width {:.2}mm is not supported by genpdf; lines use the default width",
                stroke.width_mm
            );
            self.width_ignored = true;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<u8>, ReportError> {
        let renderer = self.renderer.take().ok_or(ReportError::EmptyReport)?;
        let mut bytes = Vec::new();
        renderer.write(&mut bytes)?;
        Ok(bytes)
    }
}
