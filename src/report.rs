//! Band registration and the render loop.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use log::{debug, info};

use crate::bands::{self, Band, BandFn, BandKind};
use crate::canvas::{Bookmark, Canvas};
use crate::error::ReportError;
use crate::style::{FontSettings, Padding};
use crate::surface::{GenpdfSurface, Surface};
use crate::units::PageSetup;
use crate::variables::Variables;

/// Document-wide defaults shared with the canvas.
#[derive(Clone, Debug)]
pub(crate) struct ReportConfig {
    pub(crate) title: String,
    pub(crate) font: FontSettings,
    pub(crate) padding: Option<Padding>,
    pub(crate) line_width: Option<f64>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: String::from("Report"),
            font: FontSettings::default(),
            padding: None,
            line_width: None,
        }
    }
}

/// Output of a render.
#[derive(Clone, Debug)]
pub struct RenderedReport {
    /// Bytes produced by the surface (a PDF for [`GenpdfSurface`]).
    pub bytes: Vec<u8>,
    /// Number of pages started.
    pub page_count: usize,
    /// Bookmarks recorded with [`Canvas::bookmark`].
    pub bookmarks: Vec<Bookmark>,
}

impl RenderedReport {
    /// Writes the rendered bytes to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }
}

fn boxed<F>(callback: F) -> Box<BandFn>
where
    F: Fn(&mut Canvas<'_>) -> Result<(), ReportError> + 'static,
{
    Box::new(callback)
}

/// A banded report: an ordered list of bands plus the variables they read.
///
/// ```no_run
/// use pdf_bands::{CellOptions, PageSetup, Report};
///
/// let report = Report::new()
///     .with_title("Inventory")
///     .page_start(PageSetup::default())
///     .page_header(|canvas| canvas.column("Inventory", &CellOptions::new(), true))
///     .master_data("items", |canvas, item: &String, _| {
///         canvas.column(item, &CellOptions::new(), true)
///     })
///     .page_end()
///     .with_variable("items", vec!["Bolts".to_string(), "Nuts".to_string()]);
///
/// report.render_to_file("inventory.pdf")?;
/// # Ok::<(), pdf_bands::ReportError>(())
/// ```
#[derive(Debug, Default)]
pub struct Report {
    bands: Vec<Band>,
    variables: Variables,
    config: ReportConfig,
}

impl Report {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Sets the font cells use until a band changes it.
    pub fn with_default_font(mut self, font: FontSettings) -> Self {
        self.config.font = font;
        self
    }

    /// Sets the default cell padding, in document units.
    pub fn with_default_padding(mut self, padding: impl Into<Padding>) -> Self {
        self.config.padding = Some(padding.into());
        self
    }

    /// Sets the default border width, in document units.
    pub fn with_default_line_width(mut self, width: f64) -> Self {
        self.config.line_width = Some(width);
        self
    }

    /// Stores a variable and returns the report.
    pub fn with_variable<T: 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.variables.set(name, value);
        self
    }

    /// Stores a variable; master data bands read their rows from here.
    pub fn set_variable<T: 'static>(&mut self, name: impl Into<String>, value: T) {
        self.variables.set(name, value);
    }

    /// Reads back a stored variable.
    pub fn variable<T: 'static>(&self, name: &str) -> Result<Rc<T>, ReportError> {
        self.variables.get(name)
    }

    /// Registered bands in order.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Document title.
    pub fn title(&self) -> &str {
        &self.config.title
    }

    fn push(mut self, band: Band) -> Self {
        debug!("Registering band {} ({:?})", self.bands.len(), band.kind());
        self.bands.push(band);
        self
    }

    /// Opens a page range; every page in it uses `setup`.
    pub fn page_start(self, setup: PageSetup) -> Self {
        self.push(Band::page_start(setup))
    }

    /// Registers the header printed at the top of each page of the range.
    pub fn page_header<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Canvas<'_>) -> Result<(), ReportError> + 'static,
    {
        self.push(Band::callback(BandKind::PageHeader, boxed(callback)))
    }

    /// Registers free-form page content.
    pub fn page_body<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Canvas<'_>) -> Result<(), ReportError> + 'static,
    {
        self.push(Band::callback(BandKind::PageBody, boxed(callback)))
    }

    /// Registers the footer printed at the bottom margin of each page of the range.
    pub fn page_footer<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Canvas<'_>) -> Result<(), ReportError> + 'static,
    {
        self.push(Band::callback(BandKind::PageFooter, boxed(callback)))
    }

    /// Closes the page range.
    pub fn page_end(self) -> Self {
        self.push(Band::page_end())
    }

    /// Registers the header printed before master data and after page breaks inside it.
    pub fn master_header<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Canvas<'_>) -> Result<(), ReportError> + 'static,
    {
        self.push(Band::callback(BandKind::MasterHeader, boxed(callback)))
    }

    /// Registers the footer printed after master data and before page breaks inside it.
    pub fn master_footer<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Canvas<'_>) -> Result<(), ReportError> + 'static,
    {
        self.push(Band::callback(BandKind::MasterFooter, boxed(callback)))
    }

    /// Registers a band repeated for every row of the `Vec<T>` variable `dataset`.
    ///
    /// The master header is printed first and the master footer last; `row`
    /// receives each element with its index.
    pub fn master_data<T, F>(self, dataset: impl Into<String>, row: F) -> Self
    where
        T: 'static,
        F: Fn(&mut Canvas<'_>, &T, usize) -> Result<(), ReportError> + 'static,
    {
        let dataset = dataset.into();
        let name = dataset.clone();
        let callback = boxed(move |canvas| {
            let rows = canvas.variable::<Vec<T>>(&name)?;
            debug!("Printing {} rows of '{}'", rows.len(), name);
            canvas.print_band(BandKind::MasterHeader)?;
            for (index, item) in rows.iter().enumerate() {
                row(canvas, item, index)?;
            }
            canvas.print_band(BandKind::MasterFooter)
        });
        self.push(Band::master_data(dataset, callback))
    }

    /// Renders onto `surface`.
    pub fn render_with(&self, surface: &mut dyn Surface) -> Result<RenderedReport, ReportError> {
        bands::validate(&self.bands)?;

        let mut canvas = Canvas::new(surface, &self.bands, &self.variables, &self.config);
        for (index, band) in self.bands.iter().enumerate() {
            if band.is_auto_called() {
                continue;
            }
            canvas.dispatch(index)?;
        }

        let (bytes, page_count, bookmarks) = canvas.finish()?;
        info!(
            "Rendered '{}': {} page(s), {} bytes",
            self.config.title,
            page_count,
            bytes.len()
        );
        Ok(RenderedReport {
            bytes,
            page_count,
            bookmarks,
        })
    }

    /// Renders to PDF with the default font family.
    pub fn render(&self) -> Result<RenderedReport, ReportError> {
        let mut surface = GenpdfSurface::with_default_fonts(self.config.title.as_str())?;
        self.render_with(&mut surface)
    }

    /// Renders to PDF and writes it to `path`.
    pub fn render_to_file(&self, path: impl AsRef<Path>) -> Result<RenderedReport, ReportError> {
        let rendered = self.render()?;
        rendered.save(path)?;
        Ok(rendered)
    }

    /// Renders to PDF and embeds the recorded bookmarks as a document outline.
    #[cfg(feature = "bookmarks")]
    pub fn render_with_bookmarks(&self) -> Result<RenderedReport, ReportError> {
        let mut rendered = self.render()?;
        rendered.bytes = crate::bookmarks::apply_bookmarks(&rendered.bytes, &rendered.bookmarks)?;
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::CellOptions;
    use crate::surface::RecordingSurface;
    use crate::units::{PageFormat, Unit};

    fn setup() -> PageSetup {
        PageSetup::default()
            .with_format(PageFormat::Custom {
                width_mm: 100.0,
                height_mm: 100.0,
            })
            .with_unit(Unit::Millimetre)
            .with_margins(10.0)
    }

    #[test]
    fn empty_report_is_rejected() {
        let mut surface = RecordingSurface::new();
        assert!(matches!(
            Report::new().render_with(&mut surface),
            Err(ReportError::EmptyReport)
        ));
    }

    #[test]
    fn header_and_footer_are_not_dispatched_by_the_loop() {
        let report = Report::new()
            .page_start(setup())
            .page_header(|canvas| canvas.column("head", &CellOptions::new(), true))
            .page_body(|canvas| canvas.column("body", &CellOptions::new(), true))
            .page_footer(|canvas| canvas.column("foot", &CellOptions::new(), true))
            .page_end();

        let mut surface = RecordingSurface::new();
        let rendered = report.render_with(&mut surface).unwrap();
        assert_eq!(rendered.page_count, 1);
        assert_eq!(surface.texts_on_page(1), vec!["head", "foot", "body"]);
    }

    #[test]
    fn missing_dataset_fails_the_render() {
        let report = Report::new()
            .page_start(setup())
            .master_data("rows", |_, _: &u32, _| Ok(()));
        let mut surface = RecordingSurface::new();
        assert!(matches!(
            report.render_with(&mut surface),
            Err(ReportError::MissingVariable(name)) if name == "rows"
        ));
    }

    #[test]
    fn callback_errors_propagate() {
        let report = Report::new()
            .page_start(setup())
            .page_body(|_| Err(ReportError::callback("boom")));
        let mut surface = RecordingSurface::new();
        let err = report.render_with(&mut surface).unwrap_err();
        assert_eq!(err.to_string(), "Band callback failed: boom");
    }

    #[test]
    fn variables_can_be_read_back() {
        let mut report = Report::new().with_variable("title", String::from("Stock"));
        report.set_variable("count", 3usize);
        assert_eq!(report.variable::<String>("title").unwrap().as_str(), "Stock");
        assert_eq!(*report.variable::<usize>("count").unwrap(), 3);
    }
}
