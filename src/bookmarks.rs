//! PDF outline injection for bookmarks recorded while rendering.

use std::collections::BTreeMap;
use std::fmt;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::canvas::Bookmark;

/// Errors raised while embedding bookmarks into a rendered document.
#[derive(Debug)]
pub enum BookmarkError {
    /// `lopdf` could not parse or write the document.
    Parse(lopdf::Error),
    /// The trailer has no usable `/Root` catalog.
    MissingCatalog,
    /// The catalog object is not a dictionary.
    InvalidCatalog,
    /// A bookmark points at a page the document does not have.
    MissingPage {
        /// Bookmark title.
        title: String,
        /// Requested 1-based page number.
        page: usize,
    },
}

impl From<lopdf::Error> for BookmarkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err)
    }
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Failed to process PDF bytes: {err}"),
            Self::MissingCatalog => write!(f, "PDF catalog entry is missing"),
            Self::InvalidCatalog => write!(f, "PDF catalog entry is not a dictionary"),
            Self::MissingPage { title, page } => {
                write!(f, "Bookmark '{}' refers to missing page {}", title, page)
            }
        }
    }
}

impl std::error::Error for BookmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

struct OutlineItem<'a> {
    id: ObjectId,
    page: ObjectId,
    title: &'a str,
}

/// Adds a flat `/Outlines` tree with one `/Fit` destination per bookmark.
///
/// Returns the input unchanged when `bookmarks` is empty.
pub fn apply_bookmarks(pdf_bytes: &[u8], bookmarks: &[Bookmark]) -> Result<Vec<u8>, BookmarkError> {
    if bookmarks.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();
    let items = outline_items(&mut document, &pages, bookmarks)?;

    let outlines_id = document.new_object_id();
    for (index, item) in items.iter().enumerate() {
        let mut entry = Dictionary::new();
        entry.set("Title", Object::string_literal(item.title));
        entry.set(
            "Dest",
            Object::Array(vec![Object::Reference(item.page), Object::Name("Fit".into())]),
        );
        entry.set("Parent", Object::Reference(outlines_id));
        if let Some(previous) = index.checked_sub(1).map(|i| &items[i]) {
            entry.set("Prev", Object::Reference(previous.id));
        }
        if let Some(next) = items.get(index + 1) {
            entry.set("Next", Object::Reference(next.id));
        }
        document.objects.insert(item.id, Object::Dictionary(entry));
    }

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name("Outlines".into()));
    outlines.set("Count", Object::Integer(items.len() as i64));
    if let (Some(first), Some(last)) = (items.first(), items.last()) {
        outlines.set("First", Object::Reference(first.id));
        outlines.set("Last", Object::Reference(last.id));
    }
    document
        .objects
        .insert(outlines_id, Object::Dictionary(outlines));

    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| BookmarkError::MissingCatalog)?;
    document
        .objects
        .get_mut(&catalog_id)
        .ok_or(BookmarkError::MissingCatalog)?
        .as_dict_mut()
        .map_err(|_| BookmarkError::InvalidCatalog)?
        .set("Outlines", Object::Reference(outlines_id));

    let mut buffer = Vec::new();
    document.save_to(&mut buffer).map_err(lopdf::Error::from)?;
    Ok(buffer)
}

fn outline_items<'a>(
    document: &mut Document,
    pages: &BTreeMap<u32, ObjectId>,
    bookmarks: &'a [Bookmark],
) -> Result<Vec<OutlineItem<'a>>, BookmarkError> {
    bookmarks
        .iter()
        .map(|bookmark| {
            let page = u32::try_from(bookmark.page)
                .ok()
                .and_then(|number| pages.get(&number).copied())
                .ok_or_else(|| BookmarkError::MissingPage {
                    title: bookmark.title.clone(),
                    page: bookmark.page,
                })?;
            Ok(OutlineItem {
                id: document.new_object_id(),
                page,
                title: &bookmark.title,
            })
        })
        .collect()
}
