//! Reads vector drawings from PDF pages.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, content::Content};

use crate::{
    error::ConvertError,
    geometry::{Point, Rect},
    pages::PageSelector,
};

pub mod content;
#[cfg(test)]
mod tests;

pub use content::{Paint, PaintedPath};

/// US Letter, used when a page has no usable `/MediaBox`.
const DEFAULT_MEDIA_BOX: Rect = Rect {
    min: Point::new(0.0, 0.0),
    max: Point::new(612.0, 792.0),
};

/// Bounds walks up the page tree, in case of malformed `/Parent` cycles.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// Vector content of a single page, in PDF points.
#[derive(Clone, Debug, PartialEq)]
pub struct PageDrawing {
    /// 1-based page number.
    pub page: u32,
    pub media_box: Rect,
    pub paths: Vec<PaintedPath>,
}

/// A loaded PDF document, decrypted if it was encrypted.
pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, ConvertError> {
        let doc = Document::load(path).map_err(|source| ConvertError::Load {
            path: path.to_owned(),
            source,
        })?;
        Self::from_document(doc)
    }

    /// Accepts encrypted documents that lopdf could already decrypt with the empty user
    /// password, such as those restricted only by an owner password.
    pub fn from_document(doc: Document) -> Result<Self, ConvertError> {
        if doc.is_encrypted() && doc.encryption_state.is_none() {
            return Err(ConvertError::Encrypted);
        }
        Ok(Self { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Resolves `selector` (all pages when `None`) into 1-based page numbers and page object
    /// IDs, in page order. Fails if any selected page does not exist.
    pub fn select_pages(
        &self,
        selector: Option<&PageSelector>,
    ) -> Result<Vec<(u32, ObjectId)>, ConvertError> {
        let all_pages = self.doc.get_pages();
        if all_pages.is_empty() {
            return Err(ConvertError::NoPages);
        }

        let Some(selector) = selector else {
            return Ok(all_pages.into_iter().collect());
        };

        let missing: PageSelector = selector
            .iter()
            .filter(|page| !all_pages.contains_key(page))
            .collect();
        if !missing.is_empty() {
            return Err(ConvertError::PagesOutOfRange {
                pages: missing,
                page_count: all_pages.len() as u32,
            });
        }

        Ok(all_pages
            .into_iter()
            .filter(|(page, _)| selector.contains(*page))
            .collect())
    }

    /// Interprets the content of a page.
    pub fn page_drawing(&self, page: u32, page_id: ObjectId) -> Result<PageDrawing, ConvertError> {
        let bytes = self
            .doc
            .get_page_content(page_id)
            .map_err(|source| ConvertError::PageContent { page, source })?;
        let content =
            Content::decode(&bytes).map_err(|source| ConvertError::PageContent { page, source })?;

        let resources = self
            .inherited(page_id, b"Resources")
            .and_then(|obj| obj.as_dict().ok());

        let mut interpreter = content::Interpreter::new(&self.doc);
        interpreter.run(&content.operations, resources, 0);

        Ok(PageDrawing {
            page,
            media_box: self.media_box(page_id),
            paths: interpreter.finish(),
        })
    }

    fn media_box(&self, page_id: ObjectId) -> Rect {
        self.inherited(page_id, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .and_then(|values| {
                let numbers: Vec<f64> = values
                    .iter()
                    .filter_map(|v| v.as_float().ok().map(f64::from))
                    .collect();
                match numbers[..] {
                    [x0, y0, x1, y1] => Rect::bounding([Point::new(x0, y0), Point::new(x1, y1)]),
                    _ => None,
                }
            })
            .unwrap_or(DEFAULT_MEDIA_BOX)
    }

    /// Looks up an inheritable page attribute, walking up the page tree.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node: Option<&Dictionary> = self.doc.get_dictionary(page_id).ok();
        for _ in 0..MAX_PAGE_TREE_DEPTH {
            let dict = node?;
            if let Ok(value) = dict.get(key) {
                return content::resolve(&self.doc, value).ok();
            }
            node = dict
                .get(b"Parent")
                .ok()
                .and_then(|parent| content::resolve(&self.doc, parent).ok())
                .and_then(|parent| parent.as_dict().ok());
        }
        None
    }
}
