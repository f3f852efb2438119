//! Converts the vector line work of PDF pages into DXF drawings.

pub mod dxf;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod pages;
pub mod pdf;

pub use dxf::Units;
pub use error::ConvertError;
pub use extract::{
    ConversionSummary, ConvertEvents, ConvertOptions, NoEvents, PageProgress, extract_and_convert,
};
pub use pages::{PageRangeError, PageSelector, parse_pages_arg};
