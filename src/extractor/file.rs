use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::etl::{Decision, EtlError, Extractor, Pairs};

/// Extraction source that can pull its items straight from a byte stream.
pub trait ReadExtractor<T> {
    fn extract_reader<R: BufRead + 'static>(
        &mut self,
        reader: R,
        decision: &mut Decision,
    ) -> Result<Option<Pairs<T>>, EtlError>;
}

/// Opens a file and streams it through an inner extractor.
///
/// Line and CSV extractors read the file lazily, one record per pull.
#[derive(Debug, Clone, Default)]
pub struct FileExtractor<E> {
    inner: E,
}

impl<E> FileExtractor<E> {
    pub fn new(inner: E) -> Self {
        FileExtractor { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<P, T, E> Extractor<P, T> for FileExtractor<E>
where
    P: AsRef<Path>,
    E: ReadExtractor<T>,
{
    fn extract(&mut self, input: P, decision: &mut Decision) -> Result<Option<Pairs<T>>, EtlError> {
        let path = input.as_ref();
        let file = File::open(path)?;
        debug!(path = %path.display(), "opened extraction file");
        self.inner.extract_reader(BufReader::new(file), decision)
    }
}
