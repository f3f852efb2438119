//! Page selection, as typed by the user (e.g. `"1,3-5"`).

use std::{collections::BTreeSet, fmt::Display, str::FromStr};

/// Reasons that page selection text is rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum PageRangeError {
    #[error("no pages specified")]
    Empty,
    /// `item` is the 1-based position of the item within the comma separated list.
    #[error("item {item} of the page list is empty")]
    EmptyItem { item: usize },
    #[error("item {item} of the page list is not a page number or page range")]
    InvalidNumber { item: usize },
    #[error("item {item} of the page list refers to page 0, pages are numbered from 1")]
    ZeroPage { item: usize },
    #[error("page range {start}-{end} is reversed")]
    Reversed { start: u32, end: u32 },
}

/// Ordered set of 1-based page numbers. An absent selector (`Option::None`) means all pages.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PageSelector(BTreeSet<u32>);

impl PageSelector {
    pub fn contains(&self, page: u32) -> bool {
        self.0.contains(&page)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<u32> for PageSelector {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for PageSelector {
    type Err = PageRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pages_arg(s)
    }
}

/// Formats as the most compact list of ranges, e.g. `1,3-5`.
impl Display for PageSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        let mut pages = self.iter().peekable();
        while let Some(start) = pages.next() {
            let mut end = start;
            while pages.peek() == Some(&(end + 1)) {
                end += 1;
                pages.next();
            }

            if !first {
                f.write_str(",")?;
            }
            first = false;

            if start == end {
                write!(f, "{}", start)?;
            } else {
                write!(f, "{}-{}", start, end)?;
            }
        }
        Ok(())
    }
}

/// Parses a comma separated list of page numbers and inclusive page ranges, such as `"1,3-5"`.
///
/// Whitespace around items and numbers is ignored. Overlapping items are merged. Empty items,
/// page 0, and reversed ranges are rejected rather than silently dropped. Page numbers are not
/// checked against any document here.
pub fn parse_pages_arg(text: &str) -> Result<PageSelector, PageRangeError> {
    if text.trim().is_empty() {
        return Err(PageRangeError::Empty);
    }

    let mut pages = BTreeSet::new();
    for (index, raw_item) in text.split(',').enumerate() {
        let item = index + 1;
        let raw_item = raw_item.trim();
        if raw_item.is_empty() {
            return Err(PageRangeError::EmptyItem { item });
        }

        match raw_item.split_once('-') {
            None => {
                pages.insert(parse_page_number(raw_item, item)?);
            }
            Some((start, end)) => {
                let start = parse_page_number(start, item)?;
                let end = parse_page_number(end, item)?;
                if start > end {
                    return Err(PageRangeError::Reversed { start, end });
                }
                pages.extend(start..=end);
            }
        }
    }

    Ok(PageSelector(pages))
}

fn parse_page_number(s: &str, item: usize) -> Result<u32, PageRangeError> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PageRangeError::InvalidNumber { item });
    }
    match s.parse::<u32>() {
        Ok(0) => Err(PageRangeError::ZeroPage { item }),
        Ok(page) => Ok(page),
        Err(_) => Err(PageRangeError::InvalidNumber { item }),
    }
}
