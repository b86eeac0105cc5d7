use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::etl::{Cursor, Decision, EtlError, Key, Loader};

/// Writes each loaded value on its own line.
pub struct FileLoader<W: Write> {
    writer: W,
    eol: String,
}

impl FileLoader<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, EtlError> {
        Ok(FileLoader::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> FileLoader<W> {
    pub fn new(writer: W) -> Self {
        FileLoader {
            writer,
            eol: "\n".to_string(),
        }
    }

    pub fn with_eol(mut self, eol: impl Into<String>) -> Self {
        self.eol = eol.into();
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<U: Display, W: Write> Loader<U> for FileLoader<W> {
    fn load(&mut self, pairs: Cursor<'_, U>, _key: &Key, _decision: &mut Decision) -> Result<(), EtlError> {
        for (_, value) in pairs {
            write!(self.writer, "{}{}", value, self.eol)?;
        }
        Ok(())
    }

    fn commit(&mut self, _partial: bool) -> Result<(), EtlError> {
        self.writer.flush()?;
        Ok(())
    }
}
