//! Ready-made load sinks.
//!
//! Wrap a sink in `Rc<RefCell<_>>` before handing it to
//! [`EtlTool::loader`](crate::etl::EtlTool::loader) to read it back after a
//! run.

pub mod array;
pub mod csv;
pub mod file;
pub mod json;
pub mod null;

pub use self::array::ArrayLoader;
pub use self::csv::CsvFileLoader;
pub use self::file::FileLoader;
pub use self::json::JsonFileLoader;
pub use self::null::NullLoader;
