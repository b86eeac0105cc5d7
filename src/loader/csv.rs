use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use ::csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::etl::{Cursor, Decision, EtlError, Key, Loader};
use crate::extractor::CsvOptions;

/// Writes each loaded value as one CSV record.
///
/// Values are serialized with serde: sequences, tuples and flat structs all
/// make valid records. The header row, when given, is written by `init`.
pub struct CsvFileLoader<W: Write> {
    writer: Writer<W>,
    header: Vec<String>,
}

impl CsvFileLoader<File> {
    pub fn create(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Self, EtlError> {
        Ok(CsvFileLoader::new(File::create(path)?, options))
    }
}

impl<W: Write> CsvFileLoader<W> {
    pub fn new(writer: W, options: &CsvOptions) -> Self {
        let mut builder = WriterBuilder::new();
        builder
            .has_headers(false)
            .delimiter(options.delimiter)
            .quote(options.quote);
        if let Some(escape) = options.escape {
            builder.double_quote(false).escape(escape);
        }

        CsvFileLoader {
            writer: builder.from_writer(writer),
            header: Vec::new(),
        }
    }

    pub fn with_header<I, S>(mut self, header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = header.into_iter().map(Into::into).collect();
        self
    }

    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, EtlError> {
        self.writer
            .into_inner()
            .map_err(|err| EtlError::Io(io::Error::new(err.error().kind(), err.error().to_string())))
    }
}

impl<U: Serialize, W: Write> Loader<U> for CsvFileLoader<W> {
    fn init(&mut self) -> Result<(), EtlError> {
        if !self.header.is_empty() {
            self.writer.write_record(&self.header)?;
        }
        Ok(())
    }

    fn load(&mut self, pairs: Cursor<'_, U>, _key: &Key, _decision: &mut Decision) -> Result<(), EtlError> {
        for (_, value) in pairs {
            self.writer.serialize(value)?;
        }
        Ok(())
    }

    fn commit(&mut self, _partial: bool) -> Result<(), EtlError> {
        self.writer.flush()?;
        Ok(())
    }
}
