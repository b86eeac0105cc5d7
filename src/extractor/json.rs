use std::io::BufRead;

use serde_json::Value;

use super::file::ReadExtractor;
use crate::etl::{Decision, EtlError, Extractor, IntoPairs, Pairs};

/// Iterates a JSON array (ordinal keys) or object (named keys).
///
/// Accepts JSON text or an already parsed [`Value`]. `null` extracts
/// nothing; any other scalar is not extractable and aborts the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExtractor;

impl JsonExtractor {
    pub fn parse(text: &str) -> Result<Option<Pairs<Value>>, EtlError> {
        let value: Value = serde_json::from_str(text)?;
        value.into_pairs()
    }
}

impl Extractor<String, Value> for JsonExtractor {
    fn extract(&mut self, input: String, _decision: &mut Decision) -> Result<Option<Pairs<Value>>, EtlError> {
        Self::parse(&input)
    }
}

impl Extractor<&str, Value> for JsonExtractor {
    fn extract(&mut self, input: &str, _decision: &mut Decision) -> Result<Option<Pairs<Value>>, EtlError> {
        Self::parse(input)
    }
}

impl Extractor<Value, Value> for JsonExtractor {
    fn extract(&mut self, input: Value, _decision: &mut Decision) -> Result<Option<Pairs<Value>>, EtlError> {
        input.into_pairs()
    }
}

// A JSON document has to be complete before its first member is known.
impl ReadExtractor<Value> for JsonExtractor {
    fn extract_reader<R: BufRead + 'static>(
        &mut self,
        reader: R,
        _decision: &mut Decision,
    ) -> Result<Option<Pairs<Value>>, EtlError> {
        let value: Value = serde_json::from_reader(reader)?;
        value.into_pairs()
    }
}
