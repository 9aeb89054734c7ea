//! Error type shared by report registration, layout and rendering.

use std::fmt;

use crate::bands::BandKind;

/// Errors produced while building or rendering a banded report.
#[derive(Debug)]
pub enum ReportError {
    /// The underlying `genpdf` toolkit failed (font loading, page creation, output).
    Pdf(genpdf::error::Error),
    /// Writing the rendered document failed.
    Io(std::io::Error),
    /// The report has no bands registered.
    EmptyReport,
    /// A dispatched band is not preceded by a page start.
    BandOutsidePage {
        /// Position of the offending band in registration order.
        index: usize,
        /// Kind of the offending band.
        kind: BandKind,
    },
    /// Drawing was requested while no page is open.
    NoActivePage,
    /// A variable lookup failed because the name is unknown.
    MissingVariable(String),
    /// A variable exists but holds a value of another type.
    VariableType {
        /// Name of the variable.
        name: String,
        /// Type requested by the caller.
        expected: &'static str,
    },
    /// A textual option (border, alignment, unit, ...) could not be parsed.
    InvalidOption {
        /// Option being parsed.
        option: &'static str,
        /// Rejected input.
        value: String,
    },
    /// A font family was registered after the document was created.
    LateFontRegistration(String),
    /// Bookmarks could not be embedded into the rendered document.
    #[cfg(feature = "bookmarks")]
    Bookmark(crate::bookmarks::BookmarkError),
    /// Error raised by a user callback.
    Callback(Box<dyn std::error::Error + Send + Sync>),
}

impl ReportError {
    /// Wraps an arbitrary error raised inside a band callback.
    pub fn callback(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Callback(err.into())
    }

    pub(crate) fn invalid_option(option: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            value: value.into(),
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf(err) => write!(f, "PDF toolkit error: {err}"),
            Self::Io(err) => write!(f, "Failed to write report: {err}"),
            Self::EmptyReport => write!(f, "Report has no bands to render"),
            Self::BandOutsidePage { index, kind } => write!(
                f,
                "Band {} ({:?}) is not preceded by a page start",
                index, kind
            ),
            Self::NoActivePage => write!(f, "No page is open; register a page start first"),
            Self::MissingVariable(name) => write!(f, "Variable '{name}' is not set"),
            Self::VariableType { name, expected } => {
                write!(f, "Variable '{name}' does not hold a value of type {expected}")
            }
            Self::InvalidOption { option, value } => {
                write!(f, "Invalid value '{value}' for option '{option}'")
            }
            Self::LateFontRegistration(name) => write!(
                f,
                "Font family '{name}' must be registered before the first page is started"
            ),
            #[cfg(feature = "bookmarks")]
            Self::Bookmark(err) => write!(f, "Failed to embed bookmarks: {err}"),
            Self::Callback(err) => write!(f, "Band callback failed: {err}"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pdf(err) => Some(err),
            Self::Io(err) => Some(err),
            #[cfg(feature = "bookmarks")]
            Self::Bookmark(err) => Some(err),
            Self::Callback(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<genpdf::error::Error> for ReportError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Pdf(err)
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(feature = "bookmarks")]
impl From<crate::bookmarks::BookmarkError> for ReportError {
    fn from(err: crate::bookmarks::BookmarkError) -> Self {
        Self::Bookmark(err)
    }
}
