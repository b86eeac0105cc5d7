use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::etl::{Cursor, Decision, EtlError, Key, Loader};

/// Buffers values by their transformed key and writes them as one JSON
/// document on the final commit of a run.
///
/// When the keys are exactly `0, 1, 2, ...` in order the document is an
/// array, otherwise an object whose field names are the keys.
pub struct JsonFileLoader<W: Write> {
    writer: W,
    pretty: bool,
    data: Vec<(Key, Value)>,
    positions: HashMap<Key, usize>,
}

impl JsonFileLoader<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, EtlError> {
        Ok(JsonFileLoader::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonFileLoader<W> {
    pub fn new(writer: W) -> Self {
        JsonFileLoader {
            writer,
            pretty: false,
            data: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn document(&self) -> Value {
        let sequential = self
            .data
            .iter()
            .enumerate()
            .all(|(i, (key, _))| key.as_index() == Some(i));

        if sequential {
            return Value::Array(self.data.iter().map(|(_, value)| value.clone()).collect());
        }
        let mut object = Map::with_capacity(self.data.len());
        for (key, value) in &self.data {
            object.insert(key.to_string(), value.clone());
        }
        Value::Object(object)
    }
}

impl<U: Serialize, W: Write> Loader<U> for JsonFileLoader<W> {
    fn init(&mut self) -> Result<(), EtlError> {
        self.data.clear();
        self.positions.clear();
        Ok(())
    }

    fn load(&mut self, pairs: Cursor<'_, U>, _key: &Key, _decision: &mut Decision) -> Result<(), EtlError> {
        for (key, value) in pairs {
            let value = serde_json::to_value(value)?;
            match self.positions.get(key) {
                Some(&i) => self.data[i].1 = value,
                None => {
                    self.positions.insert(key.clone(), self.data.len());
                    self.data.push((key.clone(), value));
                }
            }
        }
        Ok(())
    }

    fn commit(&mut self, partial: bool) -> Result<(), EtlError> {
        if partial {
            return Ok(());
        }

        let document = self.document();
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &document)?;
        } else {
            serde_json::to_writer(&mut self.writer, &document)?;
        }
        self.writer.flush()?;
        debug!(entries = self.data.len(), "wrote JSON document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::{EtlTool, Pairs};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_sequential_keys_write_an_array() {
        let sink = Rc::new(RefCell::new(JsonFileLoader::new(Vec::new())));
        let mut etl = EtlTool::<Vec<i32>, i32>::new()
            .loader(Rc::clone(&sink))
            .flush_count(1)
            .build()
            .unwrap();

        etl.process(vec![10, 20, 30]).unwrap();

        let written: Value = serde_json::from_slice(sink.borrow().get_ref()).unwrap();
        assert_eq!(written, json!([10, 20, 30]));
    }

    #[test]
    fn test_named_keys_write_an_object() {
        let sink = Rc::new(RefCell::new(JsonFileLoader::new(Vec::new())));
        let mut etl = EtlTool::<Vec<&'static str>, &'static str>::new()
            .transform_with(|item: &&'static str, _key: &Key, _decision: &mut Decision| {
                Ok(Pairs::once(Key::from(*item), item.len()))
            })
            .loader(Rc::clone(&sink))
            .build()
            .unwrap();

        etl.process(vec!["ab", "c", "ab"]).unwrap();

        let written: Value = serde_json::from_slice(sink.borrow().get_ref()).unwrap();
        assert_eq!(written, json!({"ab": 2, "c": 1}));
    }

    #[test]
    fn test_create_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        let mut etl = EtlTool::<Value, Value>::new()
            .loader(JsonFileLoader::create(&path).unwrap().pretty(true))
            .build()
            .unwrap();
        etl.process(json!({"id": 1, "name": "ann"})).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"id": 1, "name": "ann"}));
    }
}
