use std::io;

use ::csv::{ReaderBuilder, StringRecord};
use derive_builder::Builder;
use serde_json::{Map, Value};

use super::file::ReadExtractor;
use crate::etl::{Decision, EtlError, Extractor, Key, Pairs};

/// Dialect shared by [`CsvExtractor`] and
/// [`CsvFileLoader`](crate::loader::CsvFileLoader).
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub quote: u8,
    /// Escape byte inside quoted fields. `None` means quotes are escaped by
    /// doubling them.
    #[builder(setter(strip_option))]
    pub escape: Option<u8>,
    /// Use the first row as field names and extract rows as objects.
    pub create_keys: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            quote: b'"',
            escape: None,
            create_keys: false,
        }
    }
}

/// Parses CSV text into JSON rows.
///
/// Rows are arrays of strings, or objects keyed by the header row when
/// `create_keys` is set. Lines holding a single empty cell are skipped.
#[derive(Debug, Clone, Default)]
pub struct CsvExtractor {
    options: CsvOptions,
}

impl CsvExtractor {
    pub fn new(options: CsvOptions) -> Self {
        CsvExtractor { options }
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    pub fn rows(&self, text: String) -> Pairs<Value> {
        self.read(io::Cursor::new(text.into_bytes()))
    }

    /// Lazily parses records from a byte stream.
    pub fn read<R: io::Read + 'static>(&self, reader: R) -> Pairs<Value> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .escape(self.options.escape)
            .from_reader(reader);

        let records = reader
            .into_records()
            .filter(|record| !matches!(record, Ok(record) if is_blank(record)));

        if !self.options.create_keys {
            return Pairs::from_results(records.enumerate().map(
                |(i, record)| -> Result<(Key, Value), EtlError> {
                    let record = record?;
                    Ok((Key::Index(i), Value::Array(record.iter().map(cell).collect())))
                },
            ));
        }

        let mut header: Option<Vec<String>> = None;
        let rows = records.filter_map(move |record| {
            let record = match record {
                Ok(record) => record,
                Err(error) => return Some(Err(EtlError::from(error))),
            };
            match &header {
                Some(names) => Some(Ok(combine(names, &record))),
                None => {
                    header = Some(record.iter().map(str::to_string).collect());
                    None
                }
            }
        });

        Pairs::from_results(
            rows.enumerate()
                .map(|(i, row)| row.map(|row| (Key::Index(i), row))),
        )
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record.get(0) == Some("")
}

fn cell(value: &str) -> Value {
    Value::String(value.to_string())
}

// Missing cells become null, extra cells are dropped.
fn combine(names: &[String], record: &StringRecord) -> Value {
    let mut row = Map::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        row.insert(name.clone(), record.get(i).map_or(Value::Null, cell));
    }
    Value::Object(row)
}

impl Extractor<String, Value> for CsvExtractor {
    fn extract(&mut self, input: String, _decision: &mut Decision) -> Result<Option<Pairs<Value>>, EtlError> {
        Ok(Some(self.rows(input)))
    }
}

impl Extractor<&str, Value> for CsvExtractor {
    fn extract(&mut self, input: &str, _decision: &mut Decision) -> Result<Option<Pairs<Value>>, EtlError> {
        Ok(Some(self.rows(input.to_string())))
    }
}

impl ReadExtractor<Value> for CsvExtractor {
    fn extract_reader<R: io::BufRead + 'static>(
        &mut self,
        reader: R,
        _decision: &mut Decision,
    ) -> Result<Option<Pairs<Value>>, EtlError> {
        Ok(Some(self.read(reader)))
    }
}
