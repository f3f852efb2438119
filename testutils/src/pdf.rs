//! Builds small PDF documents for tests, with hand written content streams.

use std::path::Path;

use anyhow::{Context, Result};
use lopdf::{
    Dictionary, Document, EncryptionState, EncryptionVersion, Object, ObjectId, Permissions,
    Stream, StringFormat, dictionary,
};

/// A4 in PDF points.
pub const A4: [f32; 4] = [0.0, 0.0, 595.0, 842.0];

/// A form XObject to be made available to a page under `name`.
pub struct FormSpec {
    pub name: String,
    pub bbox: [f32; 4],
    pub matrix: Option<[f32; 6]>,
    pub content: String,
}

struct PageSpec {
    media_box: [f32; 4],
    content: String,
    forms: Vec<FormSpec>,
}

/// Accumulates pages, then writes them into a [Document].
#[derive(Default)]
pub struct PdfBuilder {
    pages: Vec<PageSpec>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an A4 page with the given content stream.
    pub fn page(self, content: &str) -> Self {
        self.page_with(A4, content, Vec::new())
    }

    pub fn page_with(mut self, media_box: [f32; 4], content: &str, forms: Vec<FormSpec>) -> Self {
        self.pages.push(PageSpec {
            media_box,
            content: content.to_string(),
            forms,
        });
        self
    }

    /// Adds `count` blank A4 pages.
    pub fn blank_pages(mut self, count: usize) -> Self {
        for _ in 0..count {
            self = self.page("");
        }
        self
    }

    pub fn build(self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = self
            .pages
            .into_iter()
            .map(|page| Object::Reference(add_page(&mut doc, pages_id, page)))
            .collect();
        let count = kids.len() as i64;

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc
    }

    /// Builds the document and writes it to `path`.
    pub fn save(self, path: &Path) -> Result<()> {
        let mut doc = self.build();
        doc.save(path)
            .with_context(|| format!("saving test PDF to {:?}", path))?;
        Ok(())
    }

    /// Builds the document, encrypts it with the standard security handler and writes it to
    /// `path`. An empty `user_password` gives a document that opens without a password.
    pub fn save_encrypted(self, path: &Path, user_password: &str) -> Result<()> {
        let mut doc = self.build();
        let file_id = Object::String(b"pdf2dxf-test-id!".to_vec(), StringFormat::Literal);
        doc.trailer.set("ID", Object::Array(vec![file_id.clone(), file_id]));

        let state = EncryptionState::try_from(EncryptionVersion::V2 {
            document: &doc,
            owner_password: "owner",
            user_password,
            key_length: 128,
            permissions: Permissions::all(),
        })
        .with_context(|| "preparing encryption")?;
        doc.encrypt(&state).with_context(|| "encrypting test PDF")?;
        doc.save(path)
            .with_context(|| format!("saving encrypted test PDF to {:?}", path))?;
        Ok(())
    }
}

fn add_page(doc: &mut Document, pages_id: ObjectId, page: PageSpec) -> ObjectId {
    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        page.content.into_bytes(),
    ));

    let mut xobjects = Dictionary::new();
    for form in page.forms {
        let mut form_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => reals(&form.bbox),
        };
        if let Some(matrix) = form.matrix {
            form_dict.set("Matrix", reals(&matrix));
        }
        let form_id = doc.add_object(Stream::new(form_dict, form.content.into_bytes()));
        xobjects.set(form.name.into_bytes(), Object::Reference(form_id));
    }

    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => reals(&page.media_box),
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => xobjects,
        },
    })
}

fn reals(values: &[f32]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real(*v)).collect())
}
