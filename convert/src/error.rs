use std::path::PathBuf;

use crate::pages::PageSelector;

/// Errors from [crate::extract_and_convert].
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("output directory {0:?} does not exist")]
    OutputDirMissing(PathBuf),
    #[error("output path {0:?} is not a directory")]
    OutputNotDirectory(PathBuf),
    #[error("output file {0:?} already exists")]
    OutputExists(PathBuf),
    #[error("failed to load PDF {path:?}")]
    Load {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    #[error("file is encrypted")]
    Encrypted,
    #[error("document has no pages")]
    NoPages,
    #[error(
        "{} out of range, the document has {}",
        missing_pages(pages),
        count_of(*page_count, "page")
    )]
    PagesOutOfRange {
        pages: PageSelector,
        page_count: u32,
    },
    #[error("failed to read content of page {page}")]
    PageContent {
        page: u32,
        #[source]
        source: lopdf::Error,
    },
    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("curve segments must be at least 1")]
    InvalidCurveSegments,
    #[error("conversion cancelled")]
    Cancelled,
}

fn missing_pages(pages: &PageSelector) -> String {
    match pages.len() {
        1 => format!("page {} is", pages),
        _ => format!("pages {} are", pages),
    }
}

fn count_of(count: u32, noun: &str) -> String {
    match count {
        1 => format!("1 {}", noun),
        _ => format!("{} {}s", count, noun),
    }
}
