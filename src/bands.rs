//! Band entries and the lookup rules used while rendering.

use std::fmt;

use crate::canvas::Canvas;
use crate::error::ReportError;
use crate::units::PageSetup;

/// Callback invoked with the render-time canvas.
pub type BandFn = dyn Fn(&mut Canvas<'_>) -> Result<(), ReportError>;

/// Kinds of bands that make up a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BandKind {
    /// Opens a page and prints its header and footer.
    PageStart,
    /// Printed at the top of every page of its page range.
    PageHeader,
    /// Free-form page content.
    PageBody,
    /// Printed at the bottom of every page of its page range.
    PageFooter,
    /// Closes the page range.
    PageEnd,
    /// Printed before a dataset and after every page break inside it.
    MasterHeader,
    /// Printed after a dataset and before every page break inside it.
    MasterFooter,
    /// Repeats a callback for every row of a dataset.
    MasterData,
}

impl BandKind {
    /// Whether the band is only invoked by its owner (page start or master
    /// data) and skipped by the main render loop.
    pub fn is_auto_called(self) -> bool {
        matches!(
            self,
            BandKind::PageHeader
                | BandKind::PageFooter
                | BandKind::MasterHeader
                | BandKind::MasterFooter
        )
    }
}

pub(crate) enum BandAction {
    PageStart(PageSetup),
    PageEnd,
    Callback(Box<BandFn>),
}

/// A registered band.
pub struct Band {
    kind: BandKind,
    dataset: Option<String>,
    pub(crate) action: BandAction,
}

impl Band {
    pub(crate) fn page_start(setup: PageSetup) -> Self {
        Self {
            kind: BandKind::PageStart,
            dataset: None,
            action: BandAction::PageStart(setup),
        }
    }

    pub(crate) fn page_end() -> Self {
        Self {
            kind: BandKind::PageEnd,
            dataset: None,
            action: BandAction::PageEnd,
        }
    }

    pub(crate) fn callback(kind: BandKind, callback: Box<BandFn>) -> Self {
        Self {
            kind,
            dataset: None,
            action: BandAction::Callback(callback),
        }
    }

    pub(crate) fn master_data(dataset: String, callback: Box<BandFn>) -> Self {
        Self {
            kind: BandKind::MasterData,
            dataset: Some(dataset),
            action: BandAction::Callback(callback),
        }
    }

    /// Returns the kind of the band.
    pub fn kind(&self) -> BandKind {
        self.kind
    }

    /// Returns the page setup of a page start band.
    pub fn page_setup(&self) -> Option<&PageSetup> {
        match &self.action {
            BandAction::PageStart(setup) => Some(setup),
            _ => None,
        }
    }

    /// Returns the dataset name of a master data band.
    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    /// Whether the main render loop skips this band.
    pub fn is_auto_called(&self) -> bool {
        self.kind.is_auto_called()
    }
}

impl fmt::Debug for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Band")
            .field("kind", &self.kind)
            .field("dataset", &self.dataset)
            .field("page_setup", &self.page_setup())
            .finish()
    }
}

/// Finds the band of `kind` governing the band at `current`.
///
/// The search range runs from the nearest page start at or before `current`
/// up to (excluding) the nearest page end at or after it, or the end of the
/// list.  The first matching band in that range wins, so headers and footers
/// may be registered anywhere inside their page range.
pub fn ancestor(bands: &[Band], current: usize, kind: BandKind) -> Option<usize> {
    if current >= bands.len() {
        return None;
    }
    let start = bands[..=current]
        .iter()
        .rposition(|band| band.kind == BandKind::PageStart)?;
    let end = bands[current..]
        .iter()
        .position(|band| band.kind == BandKind::PageEnd)
        .map_or(bands.len(), |offset| current + offset);

    (start..end).find(|&index| bands[index].kind == kind)
}

/// Checks that the report can be rendered: it is not empty and every
/// dispatched band has a page start before it.
pub fn validate(bands: &[Band]) -> Result<(), ReportError> {
    if bands.is_empty() {
        return Err(ReportError::EmptyReport);
    }

    let mut page_open = false;
    for (index, band) in bands.iter().enumerate() {
        match band.kind {
            BandKind::PageStart => page_open = true,
            kind if kind.is_auto_called() => {}
            kind if !page_open => return Err(ReportError::BandOutsidePage { index, kind }),
            BandKind::PageEnd => page_open = false,
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skip(_: &mut Canvas<'_>) -> Result<(), ReportError> {
        Ok(())
    }

    fn noop(kind: BandKind) -> Band {
        Band::callback(kind, Box::new(skip))
    }

    fn sample() -> Vec<Band> {
        vec![
            noop(BandKind::PageHeader),
            Band::page_start(PageSetup::default()),
            noop(BandKind::PageBody),
            noop(BandKind::PageHeader),
            noop(BandKind::MasterData),
            noop(BandKind::MasterFooter),
            Band::page_end(),
            Band::page_start(PageSetup::default()),
            noop(BandKind::PageBody),
        ]
    }

    #[test]
    fn ancestor_searches_whole_page_range() {
        let bands = sample();
        assert_eq!(ancestor(&bands, 2, BandKind::PageHeader), Some(3));
        assert_eq!(ancestor(&bands, 4, BandKind::MasterFooter), Some(5));
        assert_eq!(ancestor(&bands, 4, BandKind::PageStart), Some(1));
    }

    #[test]
    fn ancestor_stops_at_page_end() {
        let bands = sample();
        assert_eq!(ancestor(&bands, 8, BandKind::PageHeader), None);
        assert_eq!(ancestor(&bands, 8, BandKind::PageStart), Some(7));
    }

    #[test]
    fn ancestor_requires_a_page_start() {
        let bands = sample();
        assert_eq!(ancestor(&bands, 0, BandKind::PageHeader), None);
    }

    #[test]
    fn validate_rejects_body_before_page_start() {
        let bands = vec![noop(BandKind::PageBody), Band::page_start(PageSetup::default())];
        assert!(matches!(
            validate(&bands),
            Err(ReportError::BandOutsidePage {
                index: 0,
                kind: BandKind::PageBody
            })
        ));
    }

    #[test]
    fn validate_rejects_body_after_page_end() {
        let bands = vec![
            Band::page_start(PageSetup::default()),
            Band::page_end(),
            noop(BandKind::PageBody),
        ];
        assert!(matches!(
            validate(&bands),
            Err(ReportError::BandOutsidePage { index: 2, .. })
        ));
    }

    #[test]
    fn validate_accepts_headers_registered_early() {
        assert!(validate(&sample()).is_ok());
        assert!(matches!(validate(&[]), Err(ReportError::EmptyReport)));
    }

    #[test]
    fn auto_called_kinds() {
        assert!(BandKind::MasterHeader.is_auto_called());
        assert!(!BandKind::MasterData.is_auto_called());
        assert!(!BandKind::PageStart.is_auto_called());
    }
}
