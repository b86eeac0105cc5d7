use std::collections::HashMap;

use crate::etl::{Cursor, Decision, EtlError, Key, Loader};

/// Collects loaded values in memory.
///
/// With `preserve_keys`, values are stored under the key of the item they
/// were transformed from, and a repeated key overwrites the earlier value in
/// place. Otherwise values are appended under increasing ordinals.
#[derive(Debug, Clone)]
pub struct ArrayLoader<U> {
    preserve_keys: bool,
    data: Vec<(Key, U)>,
    positions: HashMap<Key, usize>,
}

impl<U> Default for ArrayLoader<U> {
    fn default() -> Self {
        ArrayLoader::new(true)
    }
}

impl<U> ArrayLoader<U> {
    pub fn new(preserve_keys: bool) -> Self {
        ArrayLoader {
            preserve_keys,
            data: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn data(&self) -> &[(Key, U)] {
        &self.data
    }

    pub fn values(&self) -> Vec<&U> {
        self.data.iter().map(|(_, value)| value).collect()
    }

    pub fn get(&self, key: &Key) -> Option<&U> {
        self.positions.get(key).map(|&i| &self.data[i].1)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<(Key, U)> {
        self.data
    }

    fn store(&mut self, key: Key, value: U) {
        match self.positions.get(&key) {
            Some(&i) => self.data[i].1 = value,
            None => {
                self.positions.insert(key.clone(), self.data.len());
                self.data.push((key, value));
            }
        }
    }
}

impl<U: Clone> Loader<U> for ArrayLoader<U> {
    fn load(&mut self, pairs: Cursor<'_, U>, key: &Key, _decision: &mut Decision) -> Result<(), EtlError> {
        for (_, value) in pairs {
            let key = if self.preserve_keys {
                key.clone()
            } else {
                Key::Index(self.data.len())
            };
            self.store(key, value.clone());
        }
        Ok(())
    }
}
