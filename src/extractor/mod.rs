//! Ready-made extraction sources.
//!
//! Each extractor plugs into [`EtlTool::with_extractor`](crate::etl::EtlTool::with_extractor).

pub mod csv;
pub mod file;
pub mod json;
pub mod text;

pub use self::csv::{CsvExtractor, CsvOptions, CsvOptionsBuilder};
pub use self::file::{FileExtractor, ReadExtractor};
pub use self::json::JsonExtractor;
pub use self::text::TextExtractor;
